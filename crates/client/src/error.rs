//! Normalized error type for every backend operation.
//!
//! Server rejections carry an optional field-keyed message map; the first
//! relevant field message is surfaced when available. Pre-flight validation
//! failures never reach the network and are wrapped as [`ApiError::Core`].

use std::collections::HashMap;

use avancement_core::error::CoreError;

/// Convenience alias for client operation results.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Pre-flight validation failure; no request was dispatched.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The session is gone (401). Fatal for this session: the consuming
    /// shell redirects to login; no retry or refresh is attempted here.
    #[error("Session expirée. Veuillez vous reconnecter.")]
    Unauthenticated,

    /// The server rejected the request.
    #[error("{message}")]
    Request {
        status: u16,
        message: String,
        /// Field-keyed validation messages, when the server provides them.
        fields: Option<HashMap<String, Vec<String>>>,
    },

    /// Transport-level failure: the request may or may not have been
    /// processed. Irreversible operations re-fetch state instead of
    /// assuming an outcome.
    #[error("Erreur réseau: {0}")]
    Network(String),

    /// The operation was superseded and aborted before completion.
    #[error("Opération annulée")]
    Cancelled,
}

impl ApiError {
    /// First message for `field`, when the server returned one.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Request {
                fields: Some(fields),
                ..
            } => fields.get(field).and_then(|v| v.first()).map(String::as_str),
            _ => None,
        }
    }

    /// First field message in the response, else the operation message.
    pub fn first_message(&self) -> String {
        if let Self::Request {
            fields: Some(fields),
            message,
            ..
        } = self
        {
            return fields
                .values()
                .flatten()
                .next()
                .cloned()
                .unwrap_or_else(|| message.clone());
        }
        self.to_string()
    }

    /// Whether the outcome of the attempted operation is unknown.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
