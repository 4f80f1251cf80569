//! Daily quota commands.

use paw_fortune_app::AppError;

use crate::display;

/// Print today's usage.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn status() -> Result<(), AppError> {
    let persistence = super::open_persistence()?;
    display::usage(&persistence.daily_usage());
    Ok(())
}

/// Zero today's count.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn reset() -> Result<(), AppError> {
    let mut persistence = super::open_persistence()?;
    persistence.reset_daily_count();
    tracing::info!("Daily count reset");
    display::usage(&persistence.daily_usage());
    Ok(())
}
