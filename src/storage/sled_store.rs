use crate::error::{EmobuddyError, Result};
use crate::storage::{default_store_path, KeyValueStore};
use std::path::{Path, PathBuf};

/// Durable key-value store on an embedded `sled` database
///
/// Every write is flushed before returning so state survives an abrupt exit.
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a store at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `EmobuddyError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> emobuddy::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("store"))?;
    /// store.set("greeting", b"hello")?;
    /// assert_eq!(store.get("greeting")?, Some(b"hello".to_vec()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EmobuddyError::Storage(format!("Failed to create parent directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| EmobuddyError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Open the store at its default location
    ///
    /// See [`default_store_path`] for how the location is chosen.
    pub fn open_default() -> Result<Self> {
        Self::open(default_store_path()?)
    }

    /// Location of the database on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| EmobuddyError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| EmobuddyError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| EmobuddyError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| EmobuddyError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| EmobuddyError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}
