//! # Storage Traits
//!
//! The persisted key-value store is an external collaborator: durable local
//! storage keyed by opaque strings. This trait is the seam between the
//! snapshot repositories and whatever actually holds the bytes, so the
//! domain layer never sees file paths (or whatever a platform substitutes
//! for them).

use anyhow::Result;

/// Durable string-keyed storage with whole-value reads and writes.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`. Deleting a missing key is fine.
    fn remove(&self, key: &str) -> Result<()>;
}
