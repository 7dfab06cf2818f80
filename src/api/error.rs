//! Project API error types

use crate::state::{remap_server_errors, Field, FieldErrors};
use serde::Deserialize;
use thiserror::Error;

/// One structured `{field, message}` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

/// The `message` member of an error body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Text(String),
    List(Vec<String>),
    Fields(Vec<FieldMessage>),
}

impl ServerMessage {
    /// Text for the page-level alert; list entries are joined with a space
    pub fn alert_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(" "),
            Self::Fields(items) => items
                .iter()
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Per-field errors. A single string is never mapped to a field.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Text(_) => FieldErrors::new(),
            Self::List(items) => remap_server_errors(items),
            Self::Fields(items) => {
                let mut errors = FieldErrors::new();
                let mut loose = Vec::new();
                for item in items {
                    match Field::from_name(&item.field) {
                        Some(field) if field != Field::General => {
                            errors.set(field, item.message.clone());
                        }
                        _ => loose.push(item.message.clone()),
                    }
                }
                let mut remapped = remap_server_errors(&loose);
                remapped.merge(errors);
                remapped
            }
        }
    }
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<ServerMessage>,
}

/// Errors from the project API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The requested project does not exist
    #[error("{0}")]
    NotFound(String),

    /// Non-2xx response; `message` is absent when the body could not be read
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<ServerMessage>,
    },

    /// The request never produced a response
    #[error("{0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
