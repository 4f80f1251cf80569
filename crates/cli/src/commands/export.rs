//! PNG card export.
//!
//! # Environment Variables
//!
//! - `PAW_FORTUNE_FONT` - Font for card text. Without it the card is
//!   exported with its image, line and badge only.

use std::path::Path;

use paw_fortune_app::card::CardRenderer;
use paw_fortune_app::config::font_path_from_env;
use paw_fortune_app::{AppError, Clock};

/// Export the fortune at `position` (1 = newest) into `out_dir`.
///
/// # Errors
///
/// Returns an error if there is no such fortune, the font cannot be
/// loaded, or the card cannot be written.
pub fn run(position: usize, out_dir: &Path) -> Result<(), AppError> {
    let persistence = super::open_persistence()?;
    let collection = persistence.load_collection();
    let fortune = super::fortune_at(&collection, position)?;

    let renderer = CardRenderer::new(font_path_from_env().as_deref())?;
    let path = renderer.export(fortune, out_dir, persistence.clock().now())?;
    crate::display::notice(&format!("📸 {}", path.display()));
    Ok(())
}
