//! Fortune records produced by the generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The animal starring in a fortune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animal {
    Cat,
    Dog,
}

impl Animal {
    /// Wire value (`cat` / `dog`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
        }
    }

    /// Emoji used in terminal output.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Cat => "🐱",
            Self::Dog => "🐶",
        }
    }
}

impl std::fmt::Display for Animal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity tier of a fortune, decided by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    #[serde(rename = "Ultra Rare")]
    UltraRare,
    Secret,
}

impl Rarity {
    /// All tiers, most common first.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::UltraRare, Self::Secret];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::UltraRare => "Ultra Rare",
            Self::Secret => "Secret",
        }
    }

    /// Chinese badge label.
    #[must_use]
    pub const fn label_zh(self) -> &'static str {
        match self {
            Self::Common => "普通",
            Self::Rare => "稀有",
            Self::UltraRare => "史诗",
            Self::Secret => "隐藏（狗屎运款）",
        }
    }

    /// Badge background color as RGB.
    #[must_use]
    pub const fn badge_rgb(self) -> [u8; 3] {
        match self {
            Self::Common => [0x9C, 0xA3, 0xAF],
            Self::Rare => [0x60, 0xA5, 0xFA],
            Self::UltraRare => [0xA8, 0x55, 0xF7],
            Self::Secret => [0xFA, 0xCC, 0x15],
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fortune text returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FortuneData {
    pub animal: Animal,
    /// Figurine name, e.g. "摸鱼大师".
    pub title: String,
    /// Very short description of the pose and prop.
    pub action_description: String,
    pub fortune_quote: String,
    /// One or two English words printed on the figurine base.
    pub base_label: String,
    /// Detailed English prompt for the image model.
    pub visual_prompt: String,
    pub rarity: Rarity,
}

/// A fortune with its rendered image; the unit stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFortune {
    #[serde(flatten)]
    pub data: FortuneData,
    /// Image as a `data:` URI.
    pub image_url: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl GeneratedFortune {
    /// Attach an image and creation time to generated text.
    #[must_use]
    pub fn new(data: FortuneData, image_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            data,
            image_url,
            timestamp: created_at.timestamp_millis(),
        }
    }

    /// Creation time, if the stored timestamp is representable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
