// src/domain/repositories/config_store.rs
use crate::domain::error::DomainResult;
use crate::domain::import::ImportMode;
use std::str::FromStr;
use tracing::warn;

pub const IMPORT_MODE_KEY: &str = "import_mode";

/// Runtime key/value configuration, writable while the service is running
pub trait ConfigStore: std::fmt::Debug + Send + Sync {
    fn get(&self, key: &str) -> DomainResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Import mode stored at runtime, or `default` when unset or unreadable
    fn import_mode(&self, default: ImportMode) -> ImportMode {
        match self.get(IMPORT_MODE_KEY) {
            Ok(Some(value)) => ImportMode::from_str(&value).unwrap_or_else(|e| {
                warn!("Ignoring stored import mode: {}", e);
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!("Cannot read import mode, using {}: {}", default, e);
                default
            }
        }
    }

    fn set_import_mode(&self, mode: ImportMode) -> DomainResult<()> {
        self.set(IMPORT_MODE_KEY, mode.as_str())
    }
}
