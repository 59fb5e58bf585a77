//! Persistent player progress.
//!
//! Progress is a flat map of integer counters. The only counter in use is
//! the coin balance, credited when the local player's team wins.

use crate::error::SessionError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Storage key of the coin balance.
pub const COINS_KEY: &str = "checkers_coins";

/// Integer key/value storage.
pub trait ProgressStore {
    /// Value for `key`, or `default` if unset.
    fn get_int(&self, key: &str, default: i64) -> i64;

    /// Stores `value` under `key`.
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SessionError>;
}

/// In-memory store, lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a JSON object, rewritten on every update.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            debug!("No progress file yet");
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value);
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Coin balance on top of a [`ProgressStore`].
#[derive(Debug, Clone)]
pub struct Wallet<S: ProgressStore> {
    store: S,
}

impl<S: ProgressStore> Wallet<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current balance.
    pub fn coins(&self) -> i64 {
        self.store.get_int(COINS_KEY, 0)
    }

    /// Credits `amount` coins and returns the new balance.
    ///
    /// Zero and negative amounts are ignored.
    #[instrument(skip(self))]
    pub fn add_coins(&mut self, amount: i64) -> Result<i64, SessionError> {
        let current = self.coins();
        if amount <= 0 {
            debug!("Ignoring non-positive coin amount");
            return Ok(current);
        }
        let total = current.saturating_add(amount);
        self.store.set_int(COINS_KEY, total)?;
        info!(total, "Coins awarded");
        Ok(total)
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_coins_ignores_non_positive() {
        let mut wallet = Wallet::new(MemoryStore::new());
        assert_eq!(wallet.add_coins(10).expect("stored"), 10);
        assert_eq!(wallet.add_coins(0).expect("stored"), 10);
        assert_eq!(wallet.add_coins(-5).expect("stored"), 10);
        assert_eq!(wallet.coins(), 10);
    }

    #[test]
    fn test_json_store_persists_across_opens() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");

        let mut wallet = Wallet::new(JsonFileStore::open(&path).expect("opens"));
        assert_eq!(wallet.coins(), 0);
        wallet.add_coins(10).expect("stored");
        wallet.add_coins(10).expect("stored");

        let reopened = Wallet::new(JsonFileStore::open(&path).expect("reopens"));
        assert_eq!(reopened.coins(), 20);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(JsonFileStore::open(&path).is_err());
    }
}
