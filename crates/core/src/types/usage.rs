//! Daily generation quota record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Generations recorded for a single calendar day.
///
/// The date serializes as `YYYY-MM-DD`. A record whose date is not today is
/// stale and counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyUsage {
    /// Maximum generations per calendar day.
    pub const LIMIT: u32 = 3;

    /// A zeroed record for `today`.
    #[must_use]
    pub const fn fresh(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
        }
    }

    /// Resolve a stored record against today's date, resetting it if stale.
    #[must_use]
    pub fn for_today(stored: Option<Self>, today: NaiveDate) -> Self {
        match stored {
            Some(usage) if usage.date == today => usage,
            _ => Self::fresh(today),
        }
    }

    /// Whether another generation is allowed.
    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        self.count < Self::LIMIT
    }

    /// Generations left today.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        Self::LIMIT.saturating_sub(self.count)
    }

    /// This record with one more generation counted.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self {
            date: self.date,
            count: self.count.saturating_add(1),
        }
    }
}
