//! Persistent key-value storage
//!
//! Conversation state is written as whole JSON blobs under fixed keys. The
//! [`KeyValueStore`] trait is the seam between the conversation store and the
//! backend: [`SledStore`] keeps data on disk, [`MemoryStore`] keeps it in the
//! process for tests.

use crate::error::{EmobuddyError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Raw byte-level key-value backend
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read a JSON value, returning `default` when it cannot be produced
///
/// A missing key, a backend read failure and malformed JSON all yield the
/// default. Failures are logged, never returned.
///
/// # Examples
///
/// ```
/// use emobuddy::storage::{get_or, set_json, MemoryStore};
///
/// let store = MemoryStore::new();
/// assert_eq!(get_or(&store, "answer", 0u32), 0);
///
/// set_json(&store, "answer", &42u32).unwrap();
/// assert_eq!(get_or(&store, "answer", 0u32), 42);
/// ```
pub fn get_or<T>(store: &dyn KeyValueStore, key: &str, default: T) -> T
where
    T: DeserializeOwned,
{
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            tracing::debug!("No stored value for key {}, using default", key);
            return default;
        }
        Err(e) => {
            tracing::warn!("Failed to read key {}: {}; using default", key, e);
            return default;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed JSON stored under key {}: {}; using default", key, e);
            default
        }
    }
}

/// Serialize `value` as JSON and write it under `key`
pub fn set_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value)
        .map_err(EmobuddyError::Serialization)?;
    store.set(key, &bytes)
}

/// Resolve the default on-disk location of the store
///
/// The platform data directory, for example `~/.local/share/emobuddy/store`
/// on Linux. Overrides (`--store-path`, `EMOBUDDY_STORE_PATH`, the config
/// file) are resolved into `Config` before this is consulted.
pub fn default_store_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "emobuddy", "emobuddy")
        .ok_or_else(|| EmobuddyError::Storage("Could not determine data directory".into()))?;

    Ok(proj_dirs.data_dir().join("store"))
}
