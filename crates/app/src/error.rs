//! Unified error handling for the fortune engine.

use paw_fortune_core::ProfileError;
use thiserror::Error;

use crate::card::CardError;
use crate::config::ConfigError;
use crate::gemini::GeminiError;
use crate::generator::GenerationError;
use crate::storage::StorageError;

/// Application-level error type.
///
/// Only surfaces at the edges (startup, export); the open cycle itself turns
/// failures into session state instead of returning them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The local store could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Gemini client setup or call failed.
    #[error("Gemini error: {0}")]
    Gemini(#[from] GeminiError),

    /// Fortune generation failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Card export failed.
    #[error("Card error: {0}")]
    Card(#[from] CardError),

    /// Profile input was rejected.
    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    /// Terminal or filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No fortune at the requested collection position.
    #[error("Not found: {0}")]
    NotFound(String),
}
