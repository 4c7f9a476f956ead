//! Snapshot repository for the health metric store.

use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;

use crate::storage::json::migration::{migrate_health_snapshot, HealthSnapshot, RawHealthSnapshot};
use crate::storage::traits::KeyValueStore;

/// Key-value store key the health snapshot lives under.
pub const HEALTH_STORE_KEY: &str = "health-store";

/// Loads and saves the health store's whole-object snapshot.
#[derive(Clone)]
pub struct HealthStoreRepository {
    store: Arc<dyn KeyValueStore>,
}

impl HealthStoreRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted snapshot, tagged with the current version.
    /// Returns `None` on first launch.
    pub fn load(&self) -> Result<Option<HealthSnapshot>> {
        let Some(document) = self.store.get(HEALTH_STORE_KEY)? else {
            debug!("No persisted health store found");
            return Ok(None);
        };

        let raw: RawHealthSnapshot = serde_json::from_str(&document)
            .context("Failed to parse persisted health store")?;
        if raw.version.is_none() {
            debug!("Tagging legacy health store with schema version");
        }
        Ok(Some(migrate_health_snapshot(raw)))
    }

    /// Persist the whole snapshot, replacing the previous document.
    pub fn save(&self, snapshot: &HealthSnapshot) -> Result<()> {
        let document = serde_json::to_string(snapshot)
            .context("Failed to serialize health store snapshot")?;
        self.store.set(HEALTH_STORE_KEY, &document)
    }
}
