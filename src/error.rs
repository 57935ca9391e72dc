//! Custom error types for scholarbib.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, ScholarbibError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for scholarbib operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum ScholarbibError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rate limited by external API
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from API
        code: i32,
        /// Error message from API
        message: String,
    },

    /// Pagination did not terminate within the safety bound
    #[error("Pagination exceeded {0} pages without an empty page")]
    PaginationLimit(usize),

    /// Malformed publication record (missing required field)
    #[error("Data error: {0}")]
    Data(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ScholarbibError`
pub type Result<T> = std::result::Result<T, ScholarbibError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a data error message
    fn ok_or_data(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_data(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ScholarbibError::Data(msg.to_string()))
    }
}
