//! Error types for the core library
//!
//! Every failure surfaced by the gateway and the stores is a plain
//! `{ code, message }` value so it can be displayed, compared and re-raised
//! without losing information.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known error codes produced on the client side.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const TASK_BUSY: &str = "TASK_BUSY";
    pub const SIGNUP_FAILED: &str = "SIGNUP_FAILED";
    pub const SIGNIN_FAILED: &str = "SIGNIN_FAILED";
    pub const SIGNOUT_FAILED: &str = "SIGNOUT_FAILED";
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Tagged error value returned by every fallible operation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} ({code})")]
pub struct AuthError {
    pub code: String,
    pub message: String,
}

/// Coarse classification of an [`AuthError`] by its code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received
    Network,
    /// Non-2xx, non-401 response
    Http(u16),
    /// 401, intercepted globally by the gateway
    Unauthorized,
    /// Rejected at the input boundary
    Validation,
    /// Anything else, including codes embedded by the service
    Other,
}

impl AuthError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(codes::UNAUTHORIZED, SESSION_EXPIRED_MESSAGE)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_ERROR, message)
    }

    /// Synthesized error for a status code without an embedded error object
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(format!("HTTP_{}", status), message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(codes::VALIDATION_ERROR, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_RESPONSE, message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code.as_str() {
            codes::UNAUTHORIZED => ErrorKind::Unauthorized,
            codes::NETWORK_ERROR => ErrorKind::Network,
            codes::VALIDATION_ERROR => ErrorKind::Validation,
            code => code
                .strip_prefix("HTTP_")
                .and_then(|status| status.parse().ok())
                .map(ErrorKind::Http)
                .unwrap_or(ErrorKind::Other),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_response(format!("Failed to read response: {}", err))
        } else {
            Self::network(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            codes::SERIALIZATION_ERROR,
            format!("Serialization error: {}", err),
        )
    }
}
