//! Error taxonomy of the authoring workflow

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::state::FieldErrors;
use thiserror::Error;

/// Failures surfaced by the authoring controller. The display text is what
/// the user sees in the alert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    /// Local validation failed; nothing was sent
    #[error("Please fix the highlighted errors.")]
    Validation(FieldErrors),

    /// The identity provider could not start a login
    #[error("Unable to start sign-in: {0}")]
    Auth(AuthError),

    /// The signed-in user does not own the project
    #[error("You are not authorized to edit this project.")]
    Authorization,

    /// Transport failure or a response without a usable error body
    #[error("{0}")]
    Network(String),

    /// The server rejected the submission with messages
    #[error("{message}")]
    ServerValidation { message: String, fields: FieldErrors },

    #[error("{0}")]
    NotFound(String),
}

impl AuthoringError {
    /// Convert a submit failure. `rejected` is used when a non-2xx response
    /// carries no message, `unexpected` when the transport failed silently.
    pub fn from_submit(err: ApiError, rejected: &str, unexpected: &str) -> Self {
        match err {
            ApiError::Rejected {
                message: Some(message),
                ..
            } => {
                let text = message.alert_text();
                Self::ServerValidation {
                    message: if text.trim().is_empty() {
                        rejected.to_string()
                    } else {
                        text
                    },
                    fields: message.field_errors(),
                }
            }
            ApiError::Rejected { message: None, .. } => Self::Network(rejected.to_string()),
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Network(message) | ApiError::Decode(message) => {
                if message.trim().is_empty() {
                    Self::Network(unexpected.to_string())
                } else {
                    Self::Network(message)
                }
            }
        }
    }

    /// Convert a read failure; `fallback` replaces a missing server message
    pub fn from_load(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Rejected {
                message: Some(message),
                ..
            } => {
                let text = message.alert_text();
                Self::Network(if text.trim().is_empty() {
                    fallback.to_string()
                } else {
                    text
                })
            }
            ApiError::Rejected { message: None, .. } => Self::Network(fallback.to_string()),
            ApiError::Network(message) | ApiError::Decode(message) => {
                if message.trim().is_empty() {
                    Self::Network(fallback.to_string())
                } else {
                    Self::Network(message)
                }
            }
        }
    }

    /// Field errors carried by this failure, if any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(fields) | Self::ServerValidation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
