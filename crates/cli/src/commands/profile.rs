//! Profile commands.
//!
//! # Usage
//!
//! ```bash
//! paw-fortune profile set --month 2 --day 29 --chinese-zodiac rabbit
//! paw-fortune profile show
//! ```

use paw_fortune_app::AppError;
use paw_fortune_core::{ChineseZodiac, ProfileForm, ZodiacSign};
use tracing::{info, warn};

use crate::display;

/// Validate and save a profile, replacing any previous one.
///
/// Month and day go through the same form validation as the interactive
/// prompt, so `2/30` is rejected and `2/29` accepted.
///
/// # Errors
///
/// Returns an error if the birthday is missing or invalid, or the store
/// cannot be opened.
pub fn set(
    month: String,
    day: String,
    zodiac: Option<ZodiacSign>,
    chinese_zodiac: ChineseZodiac,
) -> Result<(), AppError> {
    let mut form = ProfileForm {
        month,
        day,
        chinese_zodiac,
        ..ProfileForm::default()
    };
    if let Some(zodiac) = zodiac {
        form.zodiac = zodiac;
    }
    let profile = form.submit()?;

    if let Some(requested) = zodiac
        && requested != profile.zodiac
    {
        warn!(
            requested = %requested,
            derived = %profile.zodiac,
            "Zodiac sign follows the birthday"
        );
    }

    let mut persistence = super::open_persistence()?;
    persistence.save_profile(&profile);
    info!(zodiac = %profile.zodiac, chinese_zodiac = %profile.chinese_zodiac, "Profile saved");
    display::profile(Some(&profile));
    Ok(())
}

/// Print the saved profile.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn show() -> Result<(), AppError> {
    let persistence = super::open_persistence()?;
    display::profile(persistence.load_profile().as_ref());
    Ok(())
}
