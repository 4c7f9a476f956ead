//! App configuration: where data lives and how to reach the catalog.
//!
//! A single `config.yaml` at the root of the data directory:
//!
//! ```yaml
//! data_format_version: "2"
//! catalog:
//!   base_url: "https://catalog.example.com"
//!   api_key: "anon-key"
//! ```
//!
//! Written with defaults on first run; the catalog section is optional and
//! catalog features stay disabled without it.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

/// Catalog endpoint settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data format version for future migrations.
    pub data_format_version: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_format_version: "2".to_string(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the config file from the data directory, creating it with
    /// defaults when missing.
    pub fn load_or_create(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);

        if path.exists() {
            let yaml = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            let config: AppConfig = serde_yaml::from_str(&yaml)
                .with_context(|| format!("Failed to parse config {:?}", path))?;
            debug!("Loaded config from {:?}", path);
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(data_dir)?;
            info!("Created default config at {:?}", path);
            Ok(config)
        }
    }

    /// Write the config file, creating the data directory if needed.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
        }

        let path = data_dir.join(CONFIG_FILE);
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;

        // Atomic write: temp file, then rename.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml)
            .with_context(|| format!("Failed to write config {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace config {:?}", path))?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Platform data directory for the app.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "supplement-tracker")
        .context("Could not resolve a platform data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
