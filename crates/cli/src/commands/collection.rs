//! Collection browsing.

use paw_fortune_app::AppError;

use crate::display;

/// List saved fortunes. Positions always refer to newest-first order.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn list(oldest_first: bool) -> Result<(), AppError> {
    let persistence = super::open_persistence()?;
    let collection = persistence.load_collection();
    let mut items: Vec<_> = collection.iter().enumerate().collect();
    if oldest_first {
        items.reverse();
    }
    tracing::debug!(items = items.len(), oldest_first, "Listing collection");
    display::listing(items);
    Ok(())
}

/// Print one saved fortune.
///
/// # Errors
///
/// Returns `AppError::NotFound` if there is no fortune at `position`.
pub fn show(position: usize) -> Result<(), AppError> {
    let persistence = super::open_persistence()?;
    let collection = persistence.load_collection();
    display::fortune(super::fortune_at(&collection, position)?);
    Ok(())
}
