//! # Supplement Tracker Backend
//!
//! Local-first core for the supplement tracking app: the supplement and
//! health-metric stores, the derived schedule projection, JSON snapshot
//! persistence with migration-on-load, and the thin client for the hosted
//! supplement catalog. This crate:
//! - Uses synchronous operations throughout (mutations commit in-memory,
//!   then persist)
//! - Is constructed explicitly and dependency-injected (no ambient
//!   global store)
//! - Excludes every UI concern; the embedding app owns rendering and
//!   logger initialization

pub mod catalog;
pub mod config;
pub mod domain;
pub mod storage;

pub use config::AppConfig;

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

use catalog::{CatalogApi, CatalogClient, CatalogService, DisabledCatalog};
use domain::{ChatService, HealthService, ScheduleService, SupplementService};
use storage::json::{
    ChatStoreRepository, HealthStoreRepository, JsonConnection, SupplementStoreRepository,
};
use storage::KeyValueStore;

/// Main backend struct that owns and wires all services. Built once at app
/// start and handed to the UI; never torn down within a session.
pub struct Backend {
    pub supplement_service: SupplementService,
    pub health_service: HealthService,
    pub schedule_service: ScheduleService,
    pub chat_service: ChatService,
    pub catalog_service: CatalogService,
    pub config: AppConfig,
}

impl Backend {
    /// Create a backend rooted at the platform data directory.
    pub fn new() -> Result<Self> {
        Self::with_data_dir(&config::default_data_dir()?)
    }

    /// Create a backend rooted at an explicit data directory.
    pub fn with_data_dir(data_dir: &Path) -> Result<Self> {
        let app_config = AppConfig::load_or_create(data_dir)?;

        let connection: Arc<dyn KeyValueStore> =
            Arc::new(JsonConnection::new(data_dir.join("stores"))?);

        let supplement_service =
            SupplementService::new(SupplementStoreRepository::new(connection.clone()))?;
        let health_service = HealthService::new(HealthStoreRepository::new(connection.clone()))?;
        let chat_service = ChatService::new(ChatStoreRepository::new(connection.clone()))?;
        let schedule_service = ScheduleService::new();

        let catalog_api: Arc<dyn CatalogApi> = match &app_config.catalog.base_url {
            Some(base_url) => {
                info!("Catalog endpoint configured: {}", base_url);
                Arc::new(CatalogClient::new(
                    base_url,
                    app_config.catalog.api_key.clone(),
                ))
            }
            None => {
                info!("No catalog endpoint configured; catalog lookups disabled");
                Arc::new(DisabledCatalog)
            }
        };
        let catalog_service = CatalogService::new(catalog_api);

        Ok(Backend {
            supplement_service,
            health_service,
            schedule_service,
            chat_service,
            catalog_service,
            config: app_config,
        })
    }
}
