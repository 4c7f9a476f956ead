//! Test infrastructure for storage and service tests.
//!
//! RAII-based: the temp directory lives as long as the environment, so test
//! data disappears even when a test panics.

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::JsonConnection;
use super::health_repository::HealthStoreRepository;
use super::supplement_repository::SupplementStoreRepository;
use crate::storage::traits::KeyValueStore;

/// A temp-directory-backed store connection plus the repositories built on
/// it. Dropped (and cleaned up) at the end of the test.
pub struct TestEnvironment {
    pub connection: Arc<JsonConnection>,
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        init_test_logging();
        let temp_dir = TempDir::new()?;
        let connection = Arc::new(JsonConnection::new(temp_dir.path().join("stores"))?);
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// The connection as the trait object repositories take.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.connection.clone()
    }

    pub fn supplement_repo(&self) -> SupplementStoreRepository {
        SupplementStoreRepository::new(self.store())
    }

    pub fn health_repo(&self) -> HealthStoreRepository {
        HealthStoreRepository::new(self.store())
    }
}

/// Wire `log` output into the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleans_up_on_drop() {
        let base_path;
        {
            let env = TestEnvironment::new().unwrap();
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
    }
}
