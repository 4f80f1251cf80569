//! Error types for the Gemini API client.

use thiserror::Error;

/// Errors that can occur when calling Gemini.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini returned an error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// Status string from the API, e.g. `INVALID_ARGUMENT`.
        status: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response or the fortune JSON inside it.
    #[error("parse error: {0}")]
    Parse(String),

    /// The text model answered without any text.
    #[error("No text returned from Gemini")]
    EmptyText,

    /// The image model answered without inline image data.
    #[error("No image generated")]
    NoImage,

    /// Client could not be built from configuration.
    #[error("client setup failed: {0}")]
    Setup(String),
}

/// Error body returned by the Gemini API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Error message.
    pub message: String,
    /// Canonical status name.
    #[serde(default)]
    pub status: String,
}
