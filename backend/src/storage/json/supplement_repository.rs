//! Snapshot repository for the supplement store.

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

use crate::storage::json::migration::{
    migrate_supplement_snapshot, RawSupplementSnapshot, SupplementSnapshot,
};
use crate::storage::traits::KeyValueStore;

/// Key-value store key the supplement snapshot lives under.
pub const SUPPLEMENT_STORE_KEY: &str = "supplement-store";

/// Loads and saves the supplement store's whole-object snapshot, applying
/// shape migration on the way in.
#[derive(Clone)]
pub struct SupplementStoreRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SupplementStoreRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted snapshot, migrated to the current shape.
    /// Returns `None` on first launch. `today` anchors migration fallbacks.
    pub fn load(&self, today: &str) -> Result<Option<SupplementSnapshot>> {
        let Some(document) = self.store.get(SUPPLEMENT_STORE_KEY)? else {
            debug!("No persisted supplement store found");
            return Ok(None);
        };

        let raw: RawSupplementSnapshot = serde_json::from_str(&document)
            .context("Failed to parse persisted supplement store")?;
        let was_versioned = raw.version.is_some();

        let snapshot = migrate_supplement_snapshot(raw, today);
        if !was_versioned {
            info!(
                "Migrated legacy supplement store ({} definitions)",
                snapshot.supplements.len()
            );
        }
        Ok(Some(snapshot))
    }

    /// Persist the whole snapshot, replacing the previous document.
    pub fn save(&self, snapshot: &SupplementSnapshot) -> Result<()> {
        let document = serde_json::to_string(snapshot)
            .context("Failed to serialize supplement store snapshot")?;
        self.store.set(SUPPLEMENT_STORE_KEY, &document)
    }
}
