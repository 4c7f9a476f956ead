//! Snapshot repository for the chat transcript store.

use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::models::chat::{ChatMessage, ChatStatus};
use crate::storage::traits::KeyValueStore;

/// Key-value store key the chat snapshot lives under.
pub const CHAT_STORE_KEY: &str = "chat-store";

/// Current chat snapshot schema version.
pub const CHAT_SNAPSHOT_VERSION: u32 = 1;

/// The chat store's persisted record. The transient error message is
/// deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub status: ChatStatus,
}

fn current_version() -> u32 {
    CHAT_SNAPSHOT_VERSION
}

/// Loads and saves the chat transcript's whole-object snapshot.
#[derive(Clone)]
pub struct ChatStoreRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ChatStoreRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read the persisted snapshot. Returns `None` on first launch.
    pub fn load(&self) -> Result<Option<ChatSnapshot>> {
        let Some(document) = self.store.get(CHAT_STORE_KEY)? else {
            debug!("No persisted chat store found");
            return Ok(None);
        };

        let snapshot: ChatSnapshot = serde_json::from_str(&document)
            .context("Failed to parse persisted chat store")?;
        Ok(Some(snapshot))
    }

    /// Persist the whole snapshot, replacing the previous document.
    pub fn save(&self, snapshot: &ChatSnapshot) -> Result<()> {
        let document = serde_json::to_string(snapshot)
            .context("Failed to serialize chat store snapshot")?;
        self.store.set(CHAT_STORE_KEY, &document)
    }
}
