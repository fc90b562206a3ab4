//! Error types for DSM calls.

use std::fmt;

use thiserror::Error;

use super::ServiceKind;

/// Login/logout failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("login to {service} failed: {reason}")]
    LoginFailed { service: ServiceKind, reason: String },

    #[error("logout from {service} failed: {reason}")]
    LogoutFailed { service: ServiceKind, reason: String },
}

/// Errors from session-scoped DSM operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DsmError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Application-level error embedded in the response body.
    #[error("{0}")]
    Api(ApiErrorCode),

    /// Network failure, timeout, non-2xx status or unreadable body.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DsmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DsmError::Transport("request timed out".to_string())
        } else {
            DsmError::Transport(e.to_string())
        }
    }
}

/// Common DSM WebAPI error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiErrorCode(pub i64);

impl ApiErrorCode {
    /// Human readable meaning of the code.
    pub fn description(&self) -> &'static str {
        match self.0 {
            100 => "Unknown error",
            101 => "Invalid parameter",
            102 => "The requested API does not exist",
            103 => "The requested method does not exist",
            104 => "The requested version does not support the functionality",
            105 => "The logged in session does not have permission",
            106 => "Session timeout",
            107 => "Session interrupted by duplicate login",
            _ => "Unrecognized error code",
        }
    }

    pub fn is_known(&self) -> bool {
        (100..=107).contains(&self.0)
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DSM API error {}: {}", self.0, self.description())
    }
}
