//! The user's capped, newest-first fortune history.

use serde::{Deserialize, Serialize};

use super::fortune::GeneratedFortune;

/// Fortune history, most recently added first.
///
/// Holds at most [`Collection::MAX_IN_MEMORY`] items; older items fall off
/// the end when new ones are added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GeneratedFortune>", into = "Vec<GeneratedFortune>")]
pub struct Collection(Vec<GeneratedFortune>);

impl Collection {
    /// In-memory cap.
    pub const MAX_IN_MEMORY: usize = 20;

    /// Persisted sizes to try, largest first.
    pub const PERSIST_TIERS: [usize; 3] = [10, 3, 1];

    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary items: sorted newest first and capped.
    #[must_use]
    pub fn from_items(mut items: Vec<GeneratedFortune>) -> Self {
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(Self::MAX_IN_MEMORY);
        Self(items)
    }

    /// Add a fortune at index 0 and drop whatever exceeds the cap.
    ///
    /// The fresh fortune always becomes the head, whatever its timestamp.
    pub fn prepend(&mut self, fortune: GeneratedFortune) {
        self.0.insert(0, fortune);
        self.0.truncate(Self::MAX_IN_MEMORY);
    }

    /// Number of stored fortunes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fortune at `index`, 0 being the newest.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GeneratedFortune> {
        self.0.get(index)
    }

    /// Newest fortune.
    #[must_use]
    pub fn first(&self) -> Option<&GeneratedFortune> {
        self.0.first()
    }

    /// The `n` newest fortunes.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[GeneratedFortune] {
        self.0.get(..n.min(self.0.len())).unwrap_or_default()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedFortune> {
        self.0.iter()
    }

    /// Items sorted for the gallery view.
    #[must_use]
    pub fn sorted(&self, order: SortOrder) -> Vec<&GeneratedFortune> {
        let mut items: Vec<_> = self.0.iter().collect();
        match order {
            SortOrder::NewestFirst => items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::OldestFirst => items.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        }
        items
    }

    /// Borrow as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[GeneratedFortune] {
        &self.0
    }
}

impl From<Vec<GeneratedFortune>> for Collection {
    fn from(items: Vec<GeneratedFortune>) -> Self {
        Self::from_items(items)
    }
}

impl From<Collection> for Vec<GeneratedFortune> {
    fn from(collection: Collection) -> Self {
        collection.0
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a GeneratedFortune;
    type IntoIter = std::slice::Iter<'a, GeneratedFortune>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Gallery sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// The other order.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }

    /// Toggle button label.
    #[must_use]
    pub const fn label_zh(self) -> &'static str {
        match self {
            Self::NewestFirst => "最新",
            Self::OldestFirst => "最早",
        }
    }
}

/// Paging window over the collection for the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SidebarWindow {
    start: usize,
}

impl SidebarWindow {
    /// Items shown at once.
    pub const VISIBLE: usize = 3;

    /// First visible index.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Whether "up" is available.
    #[must_use]
    pub const fn can_prev(self) -> bool {
        self.start > 0
    }

    /// Whether "down" is available for a collection of `len` items.
    #[must_use]
    pub const fn can_next(self, len: usize) -> bool {
        self.start + Self::VISIBLE < len
    }

    /// Scroll one item towards older fortunes.
    pub const fn next(&mut self, len: usize) {
        if self.can_next(len) {
            self.start += 1;
        }
    }

    /// Scroll one item towards newer fortunes.
    pub const fn prev(&mut self) {
        if self.can_prev() {
            self.start -= 1;
        }
    }

    /// The visible slice, with each item's absolute index.
    #[must_use]
    pub fn visible(self, collection: &Collection) -> Vec<(usize, &GeneratedFortune)> {
        collection
            .iter()
            .enumerate()
            .skip(self.start)
            .take(Self::VISIBLE)
            .collect()
    }
}
