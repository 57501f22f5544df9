// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directory-backed key/value store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, OnceCell};

use crate::error::CacheError;

/// Maximum key length.
const MAX_KEY_LENGTH: usize = 64;

/// Suffix for temporary files, unique within the process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk envelope around a stored value.
#[derive(Debug, Serialize, Deserialize)]
struct Entry<T> {
    key: String,
    value: T,
    updated_at: DateTime<Utc>,
}

/// Key/value store persisting one JSON file per key under a root directory.
///
/// The root directory is created lazily on first use; later calls reuse it.
/// Each write goes to its own temporary file that is renamed into place, so
/// readers never observe a partially written entry. Writes through one
/// `DeviceCache` are serialized; concurrent writers on the same root
/// (another instance) still never share a temporary file, and the last
/// rename wins.
///
/// # Examples
///
/// ```no_run
/// use midea_hvac::cache::DeviceCache;
///
/// # async fn example() -> Result<(), midea_hvac::error::CacheError> {
/// let cache = DeviceCache::new("/var/lib/node-red/midea-hvac");
///
/// cache.set("devices", &vec!["a", "b"]).await?;
/// let devices: Option<Vec<String>> = cache.get("devices").await?;
/// assert_eq!(devices, Some(vec!["a".to_string(), "b".to_string()]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceCache {
    root: PathBuf,
    initialized: OnceCell<()>,
    write_lock: Mutex<()>,
}

impl DeviceCache {
    /// Creates a store rooted at `root`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            initialized: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory if needed.
    ///
    /// Runs at most once successfully; a failed attempt is retried on the next
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn init(&self) -> Result<(), CacheError> {
        self.initialized
            .get_or_try_init(|| async {
                fs::create_dir_all(&self.root)
                    .await
                    .map_err(|e| CacheError::io(&self.root, e))?;
                tracing::debug!(root = %self.root.display(), "Cache directory ready");
                Ok::<(), CacheError>(())
            })
            .await
            .map(|_| ())
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, the file cannot be read, or
    /// its content does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        Ok(self.read_entry::<T>(key).await?.map(|entry| entry.value))
    }

    /// Returns when `key` was last written.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the entry cannot be read.
    pub async fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, CacheError> {
        Ok(self
            .read_entry::<IgnoredAny>(key)
            .await?
            .map(|entry| entry.updated_at))
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, the value cannot be encoded,
    /// or the file cannot be written.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let path = self.entry_path(key)?;
        self.init().await?;

        let entry = Entry {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        let contents = serde_json::to_vec_pretty(&entry)?;

        let tmp = self.root.join(format!(
            ".{key}.{}.{}.tmp",
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let _guard = self.write_lock.lock().await;
        if let Err(e) = fs::write(&tmp, contents).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::io(&path, e));
        }

        tracing::debug!(key, path = %path.display(), "Cache entry written");
        Ok(())
    }

    /// Removes the value stored under `key`.
    ///
    /// Returns true if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the file cannot be removed.
    pub async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(key)?;
        self.init().await?;

        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    async fn read_entry<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Entry<T>>, CacheError> {
        let path = self.entry_path(key)?;
        self.init().await?;

        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        Ok(Some(serde_json::from_slice(&contents)?))
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}
