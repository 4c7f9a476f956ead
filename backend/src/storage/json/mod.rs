//! # JSON Snapshot Storage
//!
//! File-backed implementation of the persisted key-value store plus the
//! snapshot repositories built on it. Each logical store is one JSON
//! document, rewritten whole on every mutation; shape migration runs once
//! on load, before a store is considered ready.

pub mod chat_repository;
pub mod connection;
pub mod health_repository;
pub mod migration;
pub mod supplement_repository;

#[cfg(test)]
pub mod test_utils;

pub use chat_repository::ChatStoreRepository;
pub use connection::JsonConnection;
pub use health_repository::HealthStoreRepository;
pub use migration::{HealthSnapshot, SupplementSnapshot};
pub use supplement_repository::SupplementStoreRepository;
