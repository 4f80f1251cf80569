//! Integration tests for PawFortune.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paw-fortune-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `quota` - daily limit, rollover and the hidden reset
//! - `persistence` - collection fallback cascade and profile storage
//! - `state_machine` - session transitions without I/O
//! - `end_to_end` - controller runs against an in-memory store and a
//!   scripted generator
//!
//! This library holds the shared fixtures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use paw_fortune_app::storage::MemoryStore;
use paw_fortune_app::{
    Controller, FortuneGenerator, GenerationError, ManualClock, Persistence,
};
use paw_fortune_core::{
    Animal, ChineseZodiac, FortuneData, GeneratedFortune, ProfileError, ProfileForm, Rarity,
    UserProfile,
};

/// Controller wired to in-memory collaborators.
pub type TestController<'a> = Controller<MemoryStore, &'a MockGenerator, ManualClock>;

/// 2026-10-17 08:00 UTC.
#[must_use]
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

#[must_use]
pub fn clock() -> ManualClock {
    ManualClock::new(start_time())
}

/// Persistence over `store` with a manual clock at [`start_time`].
#[must_use]
pub fn persistence(store: MemoryStore) -> Persistence<MemoryStore, ManualClock> {
    Persistence::with_clock(store, clock())
}

/// Submit a profile form the way the prompt would.
///
/// # Errors
///
/// Returns the form's validation error.
pub fn profile(
    month: &str,
    day: &str,
    chinese_zodiac: ChineseZodiac,
) -> Result<UserProfile, ProfileError> {
    ProfileForm {
        month: month.to_owned(),
        day: day.to_owned(),
        chinese_zodiac,
        ..ProfileForm::default()
    }
    .submit()
}

#[must_use]
pub fn fortune_data(title: &str) -> FortuneData {
    FortuneData {
        animal: Animal::Cat,
        title: title.to_owned(),
        action_description: "趴在键盘上打盹的橘猫".to_owned(),
        fortune_quote: "今天的bug都会自己消失".to_owned(),
        base_label: "NAP".to_owned(),
        visual_prompt: "orange cat sleeping on a keyboard".to_owned(),
        rarity: Rarity::UltraRare,
    }
}

/// A stored fortune whose image payload is `image_bytes` long.
#[must_use]
pub fn fortune(title: &str, timestamp_millis: i64, image_bytes: usize) -> GeneratedFortune {
    GeneratedFortune {
        data: fortune_data(title),
        image_url: format!("data:image/png;base64,{}", "A".repeat(image_bytes)),
        timestamp: timestamp_millis,
    }
}

/// Bytes one [`fortune`] occupies in a serialized collection.
#[must_use]
pub fn serialized_len(fortune: &GeneratedFortune) -> usize {
    serde_json::to_string(fortune).map_or(0, |json| json.len())
}

/// A fresh empty directory under the system temp dir.
#[must_use]
pub fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("paw-fortune-it-{}", uuid::Uuid::new_v4()))
}

/// Scripted outcome for one generator call.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(String),
}

/// Generator that plays back scripted outcomes and counts calls.
///
/// Text titles are numbered (`幸运签 #1`, `幸运签 #2`, ...). When a script
/// runs out, calls succeed.
#[derive(Debug, Default)]
pub struct MockGenerator {
    text_script: Mutex<VecDeque<Step>>,
    image_script: Mutex<VecDeque<Step>>,
    text_calls: AtomicUsize,
    image_calls: AtomicUsize,
    image_bytes: usize,
}

impl MockGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming text calls.
    #[must_use]
    pub fn with_text(self, steps: impl IntoIterator<Item = Step>) -> Self {
        if let Ok(mut script) = self.text_script.lock() {
            script.extend(steps);
        }
        self
    }

    /// Queue outcomes for upcoming image calls.
    #[must_use]
    pub fn with_image(self, steps: impl IntoIterator<Item = Step>) -> Self {
        if let Ok(mut script) = self.image_script.lock() {
            script.extend(steps);
        }
        self
    }

    /// Return images with a payload of `bytes` base64 characters.
    #[must_use]
    pub fn with_image_bytes(mut self, bytes: usize) -> Self {
        self.image_bytes = bytes;
        self
    }

    #[must_use]
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    fn next_step(script: &Mutex<VecDeque<Step>>) -> Step {
        script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(Step::Succeed)
    }
}

impl FortuneGenerator for MockGenerator {
    async fn generate_fortune(&self, _profile: &UserProfile) -> Result<FortuneData, GenerationError> {
        let n = self.text_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match Self::next_step(&self.text_script) {
            Step::Succeed => Ok(fortune_data(&format!("幸运签 #{n}"))),
            Step::Fail(detail) => Err(GenerationError::Other(detail)),
        }
    }

    async fn generate_image(
        &self,
        _visual_prompt: &str,
        _base_label: &str,
    ) -> Result<String, GenerationError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        match Self::next_step(&self.image_script) {
            Step::Succeed if self.image_bytes == 0 => {
                Ok("data:image/png;base64,iVBORw0KGgo=".to_owned())
            }
            Step::Succeed => Ok(format!(
                "data:image/png;base64,{}",
                "A".repeat(self.image_bytes)
            )),
            Step::Fail(detail) => Err(GenerationError::Other(detail)),
        }
    }
}
