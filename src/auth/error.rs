// src/auth/error.rs
use thiserror::Error;

/// Failure reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered with an error body
    #[error("{code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("identity provider unreachable: {0}")]
    Transport(String),

    #[error("unexpected identity provider response: {0}")]
    InvalidResponse(String),

    #[error("no active session")]
    NoSession,
}

impl ProviderError {
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code, e.g. `invalid_credentials`
    pub fn code(&self) -> &str {
        match self {
            ProviderError::Api { code, .. } => code,
            ProviderError::Transport(_) => "transport_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::NoSession => "session_not_found",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Failure of a role lookup; never crosses the gate boundary
#[derive(Debug, Error)]
pub enum RoleStoreError {
    #[error("role store unreachable: {0}")]
    Transport(String),

    #[error("unexpected role store response: {0}")]
    InvalidResponse(String),

    #[error("role store database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<reqwest::Error> for RoleStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RoleStoreError::InvalidResponse(err.to_string())
        } else {
            RoleStoreError::Transport(err.to_string())
        }
    }
}
