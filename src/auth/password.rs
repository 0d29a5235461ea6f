use bcrypt::{hash, verify, BcryptError};

/// Failures of the password hasher. A wrong password is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hashing(#[source] BcryptError),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(#[source] BcryptError),
    #[error("hashing worker failed: {0}")]
    Worker(String),
}

/// bcrypt hasher with a fixed cost. Every call to [`PasswordHasher::hash`]
/// draws a fresh random salt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(PasswordError::Hashing)
    }

    /// Returns `Ok(false)` on mismatch; errors only when `hashed` cannot be parsed.
    pub fn verify(&self, password: &str, hashed: &str) -> Result<bool, PasswordError> {
        verify(password, hashed).map_err(PasswordError::MalformedHash)
    }
}
