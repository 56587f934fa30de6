//! Error type for the API client.
//!
//! # Design
//! Every failure a call can produce collapses into `ApiError`. `Api` means
//! the server answered with a `success: false` envelope and always carries
//! the HTTP status. `Transport` means no valid envelope was reached: the
//! request never went out, the connection failed, or the body could not be
//! decoded. It has no status; the underlying fault is kept as the error
//! source.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server reported `success: false`.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        details: Option<Value>,
    },

    /// The call never produced a valid envelope.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ApiError {
    pub fn transport<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport {
            message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Api { message, .. } | ApiError::Transport { message, .. } => message,
        }
    }

    /// HTTP status of an API-level failure; `None` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport { .. } => None,
        }
    }

    /// Structured `error.details` from the envelope, if the server sent any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Api { details, .. } => details.as_ref(),
            ApiError::Transport { .. } => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}
