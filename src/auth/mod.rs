//! Authentication and authorization.
//!
//! - [`password`]: bcrypt hashing and verification.
//! - [`token`]: signed, time-bounded session tokens.
//! - [`service`]: signup and login on top of a credential store.
//! - [`gate`], [`middleware`], [`extractors`]: the per-request check that
//!   admits a protected request and hands the identity to handlers.

pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

pub use extractors::AuthenticatedUser;
pub use gate::{authorize, GateRejection};
pub use middleware::AuthMiddleware;
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthError, AuthService};
pub use token::{Claims, TokenCodec, TokenError};

/// bcrypt only looks at the first 72 bytes of a password.
const MAX_PASSWORD_BYTES: usize = 72;

/// Username and plaintext password, as posted to `/signup` and `/login`.
///
/// Lives for one request; `Debug` output never includes the password.
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Must be between 1 and 64 characters.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Must be non-empty and fit in bcrypt's 72-byte input.
    #[validate(custom = "validate_password_bytes")]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_length"));
    }
    Ok(())
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT for session authentication.
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_credentials_validation() {
        assert!(credentials("alice", "secret123").validate().is_ok());
        assert!(credentials("", "secret123").validate().is_err());
        assert!(credentials("alice", "").validate().is_err());
        assert!(credentials(&"a".repeat(65), "secret123").validate().is_err());
        assert!(credentials("alice", &"p".repeat(72)).validate().is_ok());
        assert!(credentials("alice", &"p".repeat(73)).validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let printed = format!("{:?}", credentials("alice", "hunter2"));
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }
}
