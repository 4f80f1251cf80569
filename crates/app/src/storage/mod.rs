//! Size-bounded local key-value storage.
//!
//! Values are whole JSON strings keyed by name, with a hard ceiling on the
//! total number of stored bytes. A write that would cross the ceiling fails
//! with [`StorageError::QuotaExceeded`] and leaves the previous value intact.
//!
//! # Backends
//!
//! - [`FileStore`] - one file per key under a data directory
//! - [`MemoryStore`] - in-process map, used by tests and ephemeral sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the store's size ceiling.
    #[error("storage quota exceeded writing {key}: need {needed} bytes, limit {limit}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// Key cannot be used as a storage name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The store cannot be read or written at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// String-keyed store with a size ceiling.
pub trait KeyValueStore {
    /// Read a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] if the write would push the
    /// store past its ceiling, or another error if the write fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Bytes charged for one entry.
#[must_use]
pub(crate) const fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Check a write against the ceiling.
///
/// `others` is the size of every entry except `key`.
pub(crate) fn check_quota(
    key: &str,
    value: &str,
    others: usize,
    limit: usize,
) -> Result<(), StorageError> {
    let needed = others + entry_size(key, value);
    if needed > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            limit,
        });
    }
    Ok(())
}
