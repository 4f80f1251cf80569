use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::{KeyValueStore, StorageError, check_quota, entry_size};
use crate::config::StoreConfig;

const VALUE_EXTENSION: &str = "json";

/// File-backed store: each key is `<data_dir>/<key>.json`.
///
/// Writes go to a temporary file that is renamed over the old value, so a
/// failed write never leaves a half-written entry behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    limit: usize,
}

impl FileStore {
    /// Open (and create if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        debug!(dir = %config.data_dir.display(), limit = config.quota_bytes, "Opened file store");
        Ok(Self {
            dir: config.data_dir.clone(),
            limit: config.quota_bytes,
        })
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bytes charged against the ceiling by every entry except `skip`.
    fn usage_excluding(&self, skip: &str) -> Result<usize, StorageError> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if key == skip {
                continue;
            }
            let len = usize::try_from(fs::metadata(&path)?.len()).unwrap_or(usize::MAX);
            total = entry_size(key, "").saturating_add(len).saturating_add(total);
        }
        Ok(total)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        check_quota(key, value, self.usage_excluding(key)?, self.limit)?;

        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
