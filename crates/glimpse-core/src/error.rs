//! Unified error types for Glimpse

use thiserror::Error;

/// Unified error type for all Glimpse operations
#[derive(Error, Debug)]
pub enum GlimpseError {
    // Geometry errors
    #[error("Malformed bounds: {0}")]
    MalformedBounds(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    // Driver errors
    #[error("Driver failure: {0}")]
    DriverFailure(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlimpseError {
    /// Whether this error means a query simply matched nothing.
    ///
    /// Exclusion queries treat this as an empty contribution instead of a failure.
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Self::ElementNotFound(_))
    }
}

/// Result type alias using GlimpseError
pub type Result<T> = std::result::Result<T, GlimpseError>;
