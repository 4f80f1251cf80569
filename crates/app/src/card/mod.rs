//! Shareable PNG card export.
//!
//! A card is the fortune's image on top of a tinted text block with the
//! title, a rarity badge, the action line, the wrapped quote and a footer.
//! [`layout`] computes the geometry; [`CardRenderer`] rasterizes it.

pub mod layout;
mod render;

pub use render::{CardRenderer, card_date, decode_data_uri};

use thiserror::Error;

/// Errors that can occur while exporting a card.
#[derive(Debug, Error)]
pub enum CardError {
    /// The configured font could not be loaded.
    #[error("font error: {0}")]
    Font(String),

    /// The fortune's image is not a base64 `data:` URI.
    #[error("invalid image data URI: {0}")]
    DataUri(String),

    /// Image decoding or PNG encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The output file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
