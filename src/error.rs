//! Error handling for Thoth Studio
//!
//! This module defines the application error type and a Result alias used
//! outside the pure pipeline core.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for Thoth Studio operations
#[derive(Error, Debug)]
pub enum ThothError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport-level HTTP failures (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Brain server answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Errors from the pipeline graph
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ThothError>,
    },
}

impl ThothError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ThothError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for ThothError {
    fn from(err: serde_json::Error) -> Self {
        ThothError::Serialization(err.to_string())
    }
}

/// Result type alias for Thoth Studio operations
pub type Result<T> = std::result::Result<T, ThothError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<ThothError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
