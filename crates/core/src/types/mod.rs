//! Core types for PawFortune.
//!
//! This module provides closed sum types and validated records for the
//! blind box domain.

pub mod collection;
pub mod fortune;
pub mod profile;
pub mod usage;
pub mod zodiac;

pub use collection::{Collection, SidebarWindow, SortOrder};
pub use fortune::{Animal, FortuneData, GeneratedFortune, Rarity};
pub use profile::{Birthday, ProfileError, ProfileForm, UserProfile};
pub use usage::DailyUsage;
pub use zodiac::{ChineseZodiac, ZodiacSign};
