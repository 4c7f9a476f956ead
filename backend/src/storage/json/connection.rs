//! # JSON File Connection
//!
//! File-backed implementation of the key-value store: one JSON document per
//! key in a flat directory, written atomically (temp file, then rename).
//!
//! ## Layout
//!
//! ```text
//! data/
//! └── stores/
//!     ├── supplement-store.json
//!     └── health-store.json
//! ```

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::KeyValueStore;

/// Directory-backed key-value store connection.
#[derive(Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if !base_directory.exists() {
            fs::create_dir_all(&base_directory)
                .with_context(|| format!("Failed to create store directory {:?}", base_directory))?;
            info!("Created store directory: {:?}", base_directory);
        }
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonConnection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store document {:?}", path))?;
        debug!("Read {} bytes for key '{}'", value.len(), key);
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        // Atomic write: temp file in the same directory, then rename.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write store document {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace store document {:?}", path))?;

        debug!("Wrote {} bytes for key '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove store document {:?}", path))?;
            info!("Removed store document for key '{}'", key);
        }
        Ok(())
    }
}
