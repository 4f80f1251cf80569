//! Quota and persistence helper.
//!
//! Reads and writes the daily usage counter, the profile and the fortune
//! collection. Every storage failure is caught and logged here; nothing in
//! this module returns a storage error to the interaction layer.
//!
//! # Collection fallback
//!
//! The store has a hard, unpredictable size ceiling and generated images
//! are large. Saving the collection tries the newest 10 items, then 3, then
//! only the newest one. If even that fails, history is simply not durable
//! for this session; the in-memory collection is untouched.
//!
//! Any write error triggers the next tier. Quota errors are not told apart
//! from other failures.

use paw_fortune_core::{Collection, DailyUsage, UserProfile};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the profile record.
pub const PROFILE_KEY: &str = "pawFortuneProfile";
/// Storage key for the collection array.
pub const COLLECTION_KEY: &str = "pawFortuneCollection";
/// Storage key for the daily usage record.
pub const DAILY_LIMIT_KEY: &str = "pawFortuneDailyLimit";

/// How a collection save ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The newest `items` fortunes were written using the `tier` cap.
    Stored {
        /// Fortunes written.
        items: usize,
        /// Cap that succeeded (10, 3 or 1).
        tier: usize,
    },
    /// Not even a single fortune fit; the stored history is unchanged.
    Dropped,
}

impl SaveOutcome {
    /// Fortunes durably written.
    #[must_use]
    pub const fn stored_items(self) -> usize {
        match self {
            Self::Stored { items, .. } => items,
            Self::Dropped => 0,
        }
    }
}

/// Storage-backed bookkeeping for quota, profile and collection.
#[derive(Debug)]
pub struct Persistence<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> Persistence<S, SystemClock> {
    /// Wrap a store, using the system clock.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: KeyValueStore, C: Clock> Persistence<S, C> {
    /// Wrap a store with an explicit clock.
    #[must_use]
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The clock used for dates and timestamps.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    // =========================================================================
    // Daily quota
    // =========================================================================

    /// Whether another generation is allowed today.
    ///
    /// Fails open: an unreadable store or a corrupt record allows generation.
    #[must_use]
    pub fn check_daily_limit(&self) -> bool {
        match self.read_json::<DailyUsage>(DAILY_LIMIT_KEY) {
            Ok(stored) => DailyUsage::for_today(stored, self.clock.today()).has_remaining(),
            Err(e) => {
                debug!(error = %e, "Daily usage unreadable, allowing generation");
                true
            }
        }
    }

    /// Today's usage record. Unreadable data reads as a fresh record.
    #[must_use]
    pub fn daily_usage(&self) -> DailyUsage {
        let today = self.clock.today();
        let stored = self.read_json::<DailyUsage>(DAILY_LIMIT_KEY).unwrap_or(None);
        DailyUsage::for_today(stored, today)
    }

    /// Count one generation for today, resetting a stale record first.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn increment_daily_count(&mut self) {
        let usage = self.daily_usage().incremented();
        match self.write_json(DAILY_LIMIT_KEY, &usage) {
            Ok(()) => debug!(date = %usage.date, count = usage.count, "Daily count incremented"),
            Err(e) => warn!(error = %e, "Could not save daily count"),
        }
    }

    /// Force today's count to zero.
    pub fn reset_daily_count(&mut self) {
        let usage = DailyUsage::fresh(self.clock.today());
        match self.write_json(DAILY_LIMIT_KEY, &usage) {
            Ok(()) => info!(date = %usage.date, "Daily count reset"),
            Err(e) => warn!(error = %e, "Could not reset daily count"),
        }
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The saved profile, if any. Corrupt records read as absent.
    #[must_use]
    pub fn load_profile(&self) -> Option<UserProfile> {
        self.read_json(PROFILE_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load profile");
            None
        })
    }

    /// Overwrite the saved profile. Failures are logged.
    pub fn save_profile(&mut self, profile: &UserProfile) {
        if let Err(e) = self.write_json(PROFILE_KEY, profile) {
            warn!(error = %e, "Could not save profile");
        }
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// The saved collection. Corrupt records read as empty.
    #[must_use]
    pub fn load_collection(&self) -> Collection {
        match self.read_json::<Collection>(COLLECTION_KEY) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to load collection");
                Collection::new()
            }
        }
    }

    /// Persist the newest fortunes, shrinking the batch on failure.
    pub fn save_collection(&mut self, collection: &Collection) -> SaveOutcome {
        for tier in Collection::PERSIST_TIERS {
            let batch = collection.recent(tier);
            match self.write_json(COLLECTION_KEY, batch) {
                Ok(()) => {
                    debug!(items = batch.len(), tier, "Collection saved");
                    return SaveOutcome::Stored {
                        items: batch.len(),
                        tier,
                    };
                }
                Err(e) => warn!(error = %e, tier, "Storage full, trying a smaller batch"),
            }
        }
        error!("Unable to save history, the store is full");
        SaveOutcome::Dropped
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)?;
        Ok(())
    }
}

/// Internal failure while reading or writing a JSON record.
#[derive(Debug, thiserror::Error)]
enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};
    use paw_fortune_core::{
        Animal, ChineseZodiac, FortuneData, GeneratedFortune, ProfileForm, Rarity,
    };

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn clock() -> ManualClock {
        ManualClock::new(
            DateTime::parse_from_rfc3339("2026-10-17T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn fortune(timestamp: i64, image_bytes: usize) -> GeneratedFortune {
        GeneratedFortune {
            data: FortuneData {
                animal: Animal::Dog,
                title: "暴富梦".into(),
                action_description: "举着金元宝的柯基".into(),
                fortune_quote: "财运亨通".into(),
                base_label: "RICH".into(),
                visual_prompt: "corgi holding gold".into(),
                rarity: Rarity::Rare,
            },
            image_url: format!("data:image/png;base64,{}", "A".repeat(image_bytes)),
            timestamp,
        }
    }

    fn collection(n: i64, image_bytes: usize) -> Collection {
        Collection::from_items((1..=n).map(|ts| fortune(ts, image_bytes)).collect())
    }

    fn serialized_len(items: &[GeneratedFortune]) -> usize {
        serde_json::to_string(items).unwrap().len()
    }

    #[test]
    fn test_daily_limit_three_per_day() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        for _ in 0..3 {
            assert!(p.check_daily_limit());
            p.increment_daily_count();
        }
        assert!(!p.check_daily_limit());
        assert_eq!(p.daily_usage().count, 3);
    }

    #[test]
    fn test_daily_limit_resets_on_new_day() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        for _ in 0..3 {
            p.increment_daily_count();
        }
        assert!(!p.check_daily_limit());

        p.clock().advance(TimeDelta::days(1));
        assert!(p.check_daily_limit());
        assert_eq!(p.daily_usage().count, 0);

        p.increment_daily_count();
        assert_eq!(p.daily_usage().count, 1);
    }

    #[test]
    fn test_daily_limit_fails_open() {
        let mut store = MemoryStore::unbounded();
        store.insert_raw(DAILY_LIMIT_KEY, "{not json");
        let p = Persistence::with_clock(store, clock());
        assert!(p.check_daily_limit());

        let mut store = MemoryStore::unbounded();
        store.set_unavailable(true);
        let p = Persistence::with_clock(store, clock());
        assert!(p.check_daily_limit());
    }

    #[test]
    fn test_increment_swallows_write_failure() {
        let mut store = MemoryStore::unbounded();
        store.set_unavailable(true);
        let mut p = Persistence::with_clock(store, clock());
        p.increment_daily_count();
        p.reset_daily_count();
    }

    #[test]
    fn test_reset_daily_count() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        for _ in 0..3 {
            p.increment_daily_count();
        }
        p.reset_daily_count();
        assert_eq!(p.daily_usage().count, 0);
        assert!(p.check_daily_limit());
    }

    #[test]
    fn test_save_collection_first_tier() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        let c = collection(15, 10);
        assert_eq!(
            p.save_collection(&c),
            SaveOutcome::Stored { items: 10, tier: 10 }
        );
        let loaded = p.load_collection();
        assert_eq!(loaded.len(), 10);
        assert_eq!(loaded.first().unwrap().timestamp, 15);
    }

    #[test]
    fn test_save_collection_small_collection_uses_first_tier() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        assert_eq!(
            p.save_collection(&collection(2, 10)),
            SaveOutcome::Stored { items: 2, tier: 10 }
        );
    }

    #[test]
    fn test_save_collection_falls_back_to_three() {
        let c = collection(12, 200);
        let limit = COLLECTION_KEY.len() + serialized_len(c.recent(3)) + 10;
        let mut p = Persistence::with_clock(MemoryStore::with_limit(limit), clock());
        assert_eq!(p.save_collection(&c), SaveOutcome::Stored { items: 3, tier: 3 });
        assert_eq!(p.load_collection().len(), 3);
    }

    #[test]
    fn test_save_collection_falls_back_to_one() {
        let c = collection(12, 200);
        let limit = COLLECTION_KEY.len() + serialized_len(c.recent(1)) + 10;
        let mut p = Persistence::with_clock(MemoryStore::with_limit(limit), clock());
        assert_eq!(p.save_collection(&c), SaveOutcome::Stored { items: 1, tier: 1 });
        assert_eq!(p.load_collection().first().unwrap().timestamp, 12);
    }

    #[test]
    fn test_save_collection_last_tier_keeps_fresh_fortune() {
        let mut c = collection(12, 200);
        c.prepend(fortune(5, 200));
        let limit = COLLECTION_KEY.len() + serialized_len(c.recent(1)) + 10;
        let mut p = Persistence::with_clock(MemoryStore::with_limit(limit), clock());
        assert_eq!(p.save_collection(&c), SaveOutcome::Stored { items: 1, tier: 1 });
        assert_eq!(p.load_collection().first().unwrap().timestamp, 5);
    }

    #[test]
    fn test_save_collection_gives_up_silently() {
        let mut p = Persistence::with_clock(MemoryStore::with_limit(64), clock());
        let c = collection(5, 500);
        assert_eq!(p.save_collection(&c), SaveOutcome::Dropped);
        assert_eq!(c.len(), 5, "in-memory collection is untouched");
        assert!(p.load_collection().is_empty());
    }

    #[test]
    fn test_load_collection_corrupt_reads_empty() {
        let mut store = MemoryStore::unbounded();
        store.insert_raw(COLLECTION_KEY, "[{\"broken\":");
        let p = Persistence::with_clock(store, clock());
        assert!(p.load_collection().is_empty());
    }

    #[test]
    fn test_profile_roundtrip_and_overwrite() {
        let mut p = Persistence::with_clock(MemoryStore::unbounded(), clock());
        assert_eq!(p.load_profile(), None);

        let first = ProfileForm {
            month: "5".into(),
            day: "5".into(),
            chinese_zodiac: ChineseZodiac::Tiger,
            ..ProfileForm::default()
        }
        .submit()
        .unwrap();
        p.save_profile(&first);
        assert_eq!(p.load_profile(), Some(first));

        let second = ProfileForm {
            month: "11".into(),
            day: "30".into(),
            chinese_zodiac: ChineseZodiac::Pig,
            ..ProfileForm::default()
        }
        .submit()
        .unwrap();
        p.save_profile(&second);
        assert_eq!(p.load_profile(), Some(second));
    }

    #[test]
    fn test_corrupt_profile_reads_absent() {
        let mut store = MemoryStore::unbounded();
        store.insert_raw(PROFILE_KEY, "null-ish");
        let p = Persistence::with_clock(store, clock());
        assert_eq!(p.load_profile(), None);
    }
}
