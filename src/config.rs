//! # Hydrator Configuration
//!
//! Layered configuration built with the `config` crate: compiled-in defaults,
//! then an optional TOML file, then `RECEIPT_HYDRATOR__*` environment variables.
//!
//! ```rust
//! use receipt_hydrator::config::HydratorConfig;
//!
//! let config = HydratorConfig::default();
//! assert_eq!(config.collection, "receipts");
//! assert_eq!(config.detail_prefix, "progress_detail_");
//! assert!(config.validate().is_ok());
//! ```

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::constants::{fields, store};
use crate::error::{HydratorError, Result};

/// Environment variable prefix, e.g. `RECEIPT_HYDRATOR__COLLECTION=receipts_v2`
pub const ENV_PREFIX: &str = "RECEIPT_HYDRATOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydratorConfig {
    /// Collection holding the lightweight receipt records
    pub collection: String,
    /// Sub-collection under each receipt that holds the sidecar
    pub sidecar_collection: String,
    /// Key of the sidecar document inside `sidecar_collection`
    pub sidecar_document: String,
    /// Marker prefix of dynamically named progress detail fields
    pub detail_prefix: String,
    /// Per-watcher snapshot buffer, see `InMemoryDocumentStore::from_config`
    pub snapshot_buffer_size: usize,
    /// Skip the sidecar read and deliver lightweight results only
    pub fetch_sidecar: bool,
}

impl Default for HydratorConfig {
    fn default() -> Self {
        Self {
            collection: store::RECEIPTS_COLLECTION.to_string(),
            sidecar_collection: store::SIDECAR_COLLECTION.to_string(),
            sidecar_document: store::SIDECAR_DOCUMENT.to_string(),
            detail_prefix: fields::PROGRESS_DETAIL_PREFIX.to_string(),
            snapshot_buffer_size: 64,
            fetch_sidecar: true,
        }
    }
}

impl HydratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `RECEIPT_HYDRATOR__*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Defaults, then the TOML file at `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading hydrator configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_sidecar_location<S: Into<String>>(mut self, collection: S, document: S) -> Self {
        self.sidecar_collection = collection.into();
        self.sidecar_document = document.into();
        self
    }

    pub fn with_detail_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.detail_prefix = prefix.into();
        self
    }

    pub fn with_sidecar_fetch(mut self, enabled: bool) -> Self {
        self.fetch_sidecar = enabled;
        self
    }

    pub fn with_snapshot_buffer_size(mut self, size: usize) -> Self {
        self.snapshot_buffer_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("collection", &self.collection),
            ("sidecar_collection", &self.sidecar_collection),
            ("sidecar_document", &self.sidecar_document),
        ] {
            if value.trim().is_empty() {
                return Err(HydratorError::configuration(format!(
                    "{name} cannot be empty"
                )));
            }
            if value.contains('/') {
                return Err(HydratorError::configuration(format!(
                    "{name} cannot contain '/': {value}"
                )));
            }
        }

        if self.detail_prefix.is_empty() {
            return Err(HydratorError::configuration(
                "detail_prefix cannot be empty",
            ));
        }

        if self.snapshot_buffer_size == 0 {
            return Err(HydratorError::configuration(
                "snapshot_buffer_size must be greater than 0",
            ));
        }

        Ok(())
    }
}
