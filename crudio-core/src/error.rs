//! Error types for CRUD.io operations

use crate::render::{render_text, Rendered};
use crate::{GET_FAILURE_MESSAGE, LOAD_FAILURE_MESSAGE};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file: {reason}")]
    Io { reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all CRUD.io client operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CrudError {
    /// A required argument was missing or blank.
    #[error("Missing parameter \"{field}\"")]
    InvalidArgument { field: &'static str },

    /// The Content Cloud answered with a structured error.
    #[error("Content cloud error: {message}")]
    ApplicationFailure { message: String },

    /// Network, timeout or protocol failure with no structured detail.
    #[error("Transport failure: {reason}")]
    TransportFailure { reason: String },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CrudError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            reason: reason.into(),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::ApplicationFailure {
            message: message.into(),
        }
    }

    /// Rendered text handed to error handlers after a failed `get`.
    ///
    /// Application failures carry the service's own message; everything
    /// else collapses into the generic failure text.
    pub fn rendered_for_get(&self) -> Rendered {
        match self {
            Self::ApplicationFailure { message } => render_text(message),
            _ => render_text(GET_FAILURE_MESSAGE),
        }
    }

    /// Rendered text handed to error handlers after a failed `load`.
    pub fn rendered_for_load(&self) -> Rendered {
        match self {
            Self::ApplicationFailure { message } => render_text(message),
            _ => render_text(LOAD_FAILURE_MESSAGE),
        }
    }
}

/// Result type alias for CRUD.io operations.
pub type CrudResult<T> = Result<T, CrudError>;

// =============================================================================
// TESTS
// =============================================================================
