//! Catalog access as the UI consumes it: empty-input short-circuits,
//! degrade-to-empty on failure, and the stale-result guard for in-flight
//! lookups.

use log::{error, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared::{CatalogEntry, CatalogHit, NewCatalogEntry};

use super::{CatalogApi, CatalogError};

/// Wraps the remote collaborator with the behavior the render path relies
/// on: reads never fail (they resolve empty and log), and blank input never
/// leaves the process.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn CatalogApi>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Search the catalog by name substring. Blank queries return empty
    /// without calling the remote service; failures degrade to empty.
    pub fn search(&self, query: &str) -> Vec<CatalogHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.api.search(query) {
            Ok(hits) => hits,
            Err(e) => {
                error!("Catalog search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Evidence scores for a set of catalog ids. An empty id set returns an
    /// empty map without a remote call; failures degrade to empty.
    pub fn ratings_for(&self, ids: &[String]) -> HashMap<String, f64> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.api.ratings_for(ids) {
            Ok(ratings) => ratings,
            Err(e) => {
                error!("Failed to fetch catalog ratings: {}", e);
                HashMap::new()
            }
        }
    }

    /// Full editorial entry for one catalog id; failures degrade to None.
    pub fn fetch_by_id(&self, id: &str) -> Option<CatalogEntry> {
        match self.api.fetch_by_id(id) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to fetch catalog entry {}: {}", id, e);
                None
            }
        }
    }

    /// Add a new entry to the shared catalog. Unlike the read paths this
    /// surfaces its error so the UI can tell a duplicate name apart from a
    /// generic failure.
    pub fn insert_new(&self, entry: &NewCatalogEntry) -> Result<CatalogHit, CatalogError> {
        self.api.insert_new(entry).map_err(|e| {
            warn!("Catalog insert failed: {}", e);
            e
        })
    }
}

/// Stand-in collaborator for installs with no catalog endpoint configured:
/// reads resolve empty without touching the network.
pub struct DisabledCatalog;

impl CatalogApi for DisabledCatalog {
    fn search(&self, _query: &str) -> Result<Vec<CatalogHit>, CatalogError> {
        Ok(Vec::new())
    }

    fn ratings_for(&self, _ids: &[String]) -> Result<HashMap<String, f64>, CatalogError> {
        Ok(HashMap::new())
    }

    fn fetch_by_id(&self, _id: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        Ok(None)
    }

    fn insert_new(&self, _entry: &NewCatalogEntry) -> Result<CatalogHit, CatalogError> {
        Err(CatalogError::Network("no catalog endpoint configured".to_string()))
    }
}

/// Token identifying one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// Discard-if-stale guard for asynchronous catalog lookups.
///
/// There is no cancellation: a superseded request still completes, but its
/// results no longer `accept`. Call `begin` when a lookup is issued and
/// `accept` when it resolves; a slow earlier query can then never
/// overwrite a faster later one.
pub struct SearchSession {
    generation: AtomicU64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Start a new lookup, superseding every earlier one.
    pub fn begin(&self) -> SearchToken {
        SearchToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` still identifies the newest lookup.
    pub fn is_current(&self, token: SearchToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Pass `value` through only when its lookup is still current.
    pub fn accept<T>(&self, token: SearchToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            None
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}
