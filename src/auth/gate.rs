//! The admit/reject decision for protected requests.
//!
//! Kept free of actix service plumbing so every transition can be tested
//! directly; [`super::middleware::AuthMiddleware`] applies it per request.

use actix_web::http::header::HeaderValue;

use super::extractors::AuthenticatedUser;
use super::token::{TokenCodec, TokenError};

/// Why a protected request was turned away. All variants answer 401; the
/// distinction exists for logging.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GateRejection {
    #[error("no bearer credential supplied")]
    MissingCredential,
    #[error("authorization header is not a bearer credential")]
    MalformedCredential,
    #[error("token rejected ({})", .0.kind())]
    Unauthorized(#[from] TokenError),
}

/// Runs extract, strip-scheme and validate on the raw `Authorization` header.
pub fn authorize(
    header: Option<&HeaderValue>,
    codec: &TokenCodec,
) -> Result<AuthenticatedUser, GateRejection> {
    let raw = header.ok_or(GateRejection::MissingCredential)?;
    let raw = raw
        .to_str()
        .map_err(|_| GateRejection::MalformedCredential)?
        .trim();
    if raw.is_empty() {
        return Err(GateRejection::MissingCredential);
    }

    let token = bearer_token(raw).ok_or(GateRejection::MalformedCredential)?;
    let user_id = codec.validate(token)?;
    Ok(AuthenticatedUser(user_id))
}

/// `Bearer <token>`, scheme compared case-insensitively.
fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::models::UserId;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig {
            jwt_secret: "gate-test-secret".to_string(),
            token_ttl: Duration::hours(1),
        })
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test_log::test]
    fn test_valid_bearer_token_is_admitted() {
        let codec = codec();
        let token = codec.issue(UserId(11)).unwrap();

        let admitted = authorize(Some(&header(&format!("Bearer {}", token))), &codec);
        assert_eq!(admitted, Ok(AuthenticatedUser(UserId(11))));

        let lowercase = authorize(Some(&header(&format!("bearer {}", token))), &codec);
        assert_eq!(lowercase, Ok(AuthenticatedUser(UserId(11))));
    }

    #[test_log::test]
    fn test_missing_or_empty_header() {
        let codec = codec();
        assert_eq!(authorize(None, &codec), Err(GateRejection::MissingCredential));
        assert_eq!(
            authorize(Some(&header("")), &codec),
            Err(GateRejection::MissingCredential)
        );
        assert_eq!(
            authorize(Some(&header("   ")), &codec),
            Err(GateRejection::MissingCredential)
        );
    }

    #[test_log::test]
    fn test_wrong_scheme_is_malformed() {
        let codec = codec();
        let token = codec.issue(UserId(1)).unwrap();
        for value in [
            token.clone(),
            format!("Basic {}", token),
            "Bearer".to_string(),
            "Bearer    ".to_string(),
            format!("Token {}", token),
        ] {
            assert_eq!(
                authorize(Some(&header(&value)), &codec),
                Err(GateRejection::MalformedCredential),
                "header {:?}",
                value
            );
        }
    }

    #[test_log::test]
    fn test_non_ascii_header_is_malformed() {
        let codec = codec();
        let value = HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap();
        assert_eq!(
            authorize(Some(&value), &codec),
            Err(GateRejection::MalformedCredential)
        );
    }

    #[test_log::test]
    fn test_token_failures_are_unauthorized() {
        let codec = codec();

        let garbage = authorize(Some(&header("Bearer garbage")), &codec);
        assert!(matches!(
            garbage,
            Err(GateRejection::Unauthorized(TokenError::Malformed(_)))
        ));

        let expired = codec
            .issue_at(UserId(1), Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(
            authorize(Some(&header(&format!("Bearer {}", expired))), &codec),
            Err(GateRejection::Unauthorized(TokenError::Expired))
        );

        let foreign = TokenCodec::new(&AuthConfig {
            jwt_secret: "someone-else".to_string(),
            token_ttl: Duration::hours(1),
        })
        .issue(UserId(1))
        .unwrap();
        assert_eq!(
            authorize(Some(&header(&format!("Bearer {}", foreign))), &codec),
            Err(GateRejection::Unauthorized(TokenError::SignatureInvalid))
        );
    }
}
