//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the only error type that crosses the HTTP
//! boundary. Domain errors (`AuthError`, `GateRejection`, `StoreError`,
//! validation failures) are converted into it through `From` impls, and that
//! conversion is where sanitising happens: internal details are logged here
//! and replaced by a generic message before anything reaches the client.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and
//! middleware can simply return it.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::{AuthError, GateRejection};
use crate::store::StoreError;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INTERNAL_ERROR: &str = "Internal server error";

/// Represents all errors that can be returned to a client.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// The request body could not be parsed (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// An internal fault. The message must already be generic (HTTP 500).
    InternalServerError(String),
    /// The request parsed but failed input validation (HTTP 400).
    ValidationError(String),
    /// Signup hit an existing username. The status is configurable.
    UsernameTaken(StatusCode),
}

impl AppError {
    /// Converts an authentication failure, answering `UsernameTaken` with the
    /// configured status instead of the default 500.
    pub fn from_auth(error: AuthError, username_taken_status: StatusCode) -> Self {
        match error {
            AuthError::UsernameTaken => AppError::UsernameTaken(username_taken_status),
            other => AppError::from(other),
        }
    }

    fn internal(detail: impl fmt::Display) -> Self {
        error!("{}", detail);
        AppError::InternalServerError(INTERNAL_ERROR.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::UsernameTaken(status) => write!(f, "Username Taken ({})", status),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UsernameTaken(status) => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            AppError::UsernameTaken(_) => "Failed to create user",
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// The collapsing rule: `InvalidCredentials` stays undifferentiated, every
/// internal fault becomes a generic 500.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::InvalidCredentials => AppError::Unauthorized(INVALID_CREDENTIALS.into()),
            AuthError::UsernameTaken => AppError::UsernameTaken(StatusCode::INTERNAL_SERVER_ERROR),
            internal @ (AuthError::Hashing(_)
            | AuthError::TokenIssuance(_)
            | AuthError::StoreUnavailable(_)) => AppError::internal(internal),
        }
    }
}

/// Missing credentials get their own message; anything token related is
/// reported as a plain "Invalid token" whatever the actual cause.
impl From<GateRejection> for AppError {
    fn from(rejection: GateRejection) -> AppError {
        match rejection {
            GateRejection::MissingCredential => {
                AppError::Unauthorized("Authorization header required".into())
            }
            GateRejection::MalformedCredential | GateRejection::Unauthorized(_) => {
                AppError::Unauthorized("Invalid token".into())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::internal(format!("store failure: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
