use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration, resolved once in `main` and handed to the orchestrator.
/// Nothing below the orchestrator reads configuration on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_sources: DataSources,
    pub target: TargetConfig,
}

/// Source file locations. Each key is optional in the file so that an absent
/// entry surfaces as a missing-source error instead of a deserialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSources {
    pub customers: Option<String>,
    pub products: Option<String>,
    pub orders: Option<String>,
    pub order_details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Path of the destination database file.
    pub database: String,
    /// Command timeout for clearing the destination, in seconds.
    #[serde(default = "default_clear_timeout")]
    pub clear_timeout_secs: u64,
    /// Command timeout for bulk writes, in seconds. Order line items are the
    /// largest set, so this is the longest timeout in the run.
    #[serde(default = "default_bulk_timeout")]
    pub bulk_timeout_secs: u64,
}

fn default_clear_timeout() -> u64 {
    300
}

fn default_bulk_timeout() -> u64 {
    600
}

/// All four source paths, present and non-empty.
#[derive(Debug, Clone)]
pub struct ResolvedSources {
    pub customers: PathBuf,
    pub products: PathBuf,
    pub orders: PathBuf,
    pub order_details: PathBuf,
}

impl DataSources {
    /// Resolves every source path up front, so a configuration hole aborts
    /// the run before any extraction starts.
    pub fn resolve(&self) -> Result<ResolvedSources> {
        Ok(ResolvedSources {
            customers: require(&self.customers, "data_sources.customers")?,
            products: require(&self.products, "data_sources.products")?,
            orders: require(&self.orders, "data_sources.orders")?,
            order_details: require(&self.order_details, "data_sources.order_details")?,
        })
    }
}

fn require(value: &Option<String>, key: &str) -> Result<PathBuf> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v)),
        _ => Err(EtlError::MissingSource(key.to_string())),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config: Config = toml::from_str(&content)?;

        // DATABASE_PATH overrides the configured target database
        if let Ok(db) = std::env::var("DATABASE_PATH") {
            if !db.trim().is_empty() {
                config.target.database = db;
            }
        }

        Ok(config)
    }
}
