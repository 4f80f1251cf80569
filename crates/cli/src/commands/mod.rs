//! Subcommand implementations.

pub mod collection;
pub mod export;
pub mod open;
pub mod play;
pub mod profile;
pub mod quota;

use paw_fortune_app::config::StoreConfig;
use paw_fortune_app::storage::FileStore;
use paw_fortune_app::{AppError, Persistence};
use paw_fortune_core::{Collection, GeneratedFortune};

/// Open the local store. Needs no Gemini settings.
pub fn open_persistence() -> Result<Persistence<FileStore>, AppError> {
    let config = StoreConfig::from_env()?;
    let store = FileStore::open(&config)?;
    tracing::debug!(dir = %store.dir().display(), "Store opened");
    Ok(Persistence::new(store))
}

/// Look up a fortune by its 1-based position, newest first.
pub fn fortune_at(collection: &Collection, position: usize) -> Result<&GeneratedFortune, AppError> {
    position
        .checked_sub(1)
        .and_then(|index| collection.get(index))
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "collection item {position} (have {})",
                collection.len()
            ))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use paw_fortune_core::{Animal, FortuneData, Rarity};

    use super::*;

    fn fortune(title: &str, millis: i64) -> GeneratedFortune {
        GeneratedFortune::new(
            FortuneData {
                animal: Animal::Cat,
                title: title.into(),
                action_description: "晒太阳".into(),
                fortune_quote: "今天适合躺平".into(),
                base_label: "NAP".into(),
                visual_prompt: "cat napping".into(),
                rarity: Rarity::Common,
            },
            "data:image/png;base64,AAAA".into(),
            DateTime::<Utc>::from_timestamp_millis(millis).unwrap(),
        )
    }

    #[test]
    fn test_fortune_at_is_one_based() {
        let collection = Collection::from_items(vec![fortune("old", 1), fortune("new", 2)]);
        assert_eq!(fortune_at(&collection, 1).unwrap().data.title, "new");
        assert_eq!(fortune_at(&collection, 2).unwrap().data.title, "old");
    }

    #[test]
    fn test_fortune_at_out_of_range() {
        let collection = Collection::from_items(vec![fortune("only", 1)]);
        assert!(matches!(fortune_at(&collection, 0), Err(AppError::NotFound(_))));
        let err = fortune_at(&collection, 2).unwrap_err();
        assert_eq!(err.to_string(), "Not found: collection item 2 (have 1)");
    }
}
