//! Google Gemini integration for fortune generation.
//!
//! Two `generateContent` calls per fortune:
//!
//! 1. The text model returns a JSON fortune constrained by a response
//!    schema (all seven fields required, animal and rarity as enums).
//! 2. The image model renders a figurine from the fortune's visual prompt;
//!    the first inline image part becomes a `data:` URI.
//!
//! The API key is sent in the `x-goog-api-key` header.

mod client;
mod error;
pub mod prompt;
pub mod types;

pub use client::GeminiClient;
pub use error::{ApiError, ApiErrorResponse, GeminiError};
