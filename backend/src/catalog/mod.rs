//! Catalog lookup: the shared, externally hosted supplement reference.
//!
//! The catalog is read-only from this client's perspective apart from one
//! fire-and-forget insert path. It decorates supplement cards (ratings,
//! editorial content) and prefills new definitions; nothing in the stores
//! depends on it to function.

pub mod client;
pub mod service;

pub use client::CatalogClient;
pub use service::{CatalogService, DisabledCatalog, SearchSession, SearchToken};

use shared::{CatalogEntry, CatalogHit, NewCatalogEntry};
use std::collections::HashMap;

/// Max results returned by a catalog search.
pub const SEARCH_LIMIT: usize = 5;

/// Errors from the remote catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog's uniqueness constraint on names rejected an insert.
    /// Distinguished so the UI can show a specific message.
    #[error("A catalog entry with this name already exists")]
    DuplicateName,
    #[error("Catalog request failed: {0}")]
    Network(String),
    #[error("Catalog returned status {0}")]
    Api(u16),
    #[error("Could not decode catalog response: {0}")]
    Decode(String),
}

/// The remote catalog collaborator.
///
/// Implementations are plain transports: they neither short-circuit empty
/// input nor swallow failures. `CatalogService` owns that behavior.
pub trait CatalogApi: Send + Sync {
    /// Case-insensitive containment search on names, ordered by name,
    /// limited to `SEARCH_LIMIT` results.
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>, CatalogError>;

    /// Evidence scores (0-100) for a set of catalog ids. Unknown ids are
    /// simply absent from the result map.
    fn ratings_for(&self, ids: &[String]) -> Result<HashMap<String, f64>, CatalogError>;

    /// The full editorial entry, or None when the id is unknown.
    fn fetch_by_id(&self, id: &str) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Add a new entry to the shared catalog.
    fn insert_new(&self, entry: &NewCatalogEntry) -> Result<CatalogHit, CatalogError>;
}
