use thiserror::Error;

/// Errors produced while parsing or building coordinates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("malformed coordinates '{input}': {reason}")]
    MalformedCoordinates { input: String, reason: String },

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid version: {0:?}")]
    InvalidVersion(String),
}

impl CoordinateError {
    pub(crate) fn path(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn coords(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCoordinates {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
