//! One-shot box opening.

use paw_fortune_app::config::AppConfig;
use paw_fortune_app::gemini::GeminiClient;
use paw_fortune_app::storage::FileStore;
use paw_fortune_app::{AppError, AppState, Controller, Persistence};

use crate::display;

/// Click the box once and run the cycle to the end.
///
/// Quota and generation failures are printed, not returned; the exit code
/// only reflects setup problems.
///
/// # Errors
///
/// Returns an error if configuration, the store or the Gemini client
/// cannot be set up.
pub async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let client = GeminiClient::new(&config.gemini)?;
    let store = FileStore::open(&config.store)?;

    let mut controller = Controller::new(Persistence::new(store), client, config.shake_delay)
        .with_observer(display::state);

    let report = controller.click().await;
    let session = controller.session();
    display::report(session, &report);

    if session.profile_prompt_open() {
        display::profile_prompt(false);
    }
    if let Some(message) = session.error() {
        display::error(message);
    }
    if session.state() == AppState::Revealed
        && let Some(fortune) = session.current()
    {
        display::fortune(fortune);
        display::usage(&controller.persistence().daily_usage());
    }
    Ok(())
}
