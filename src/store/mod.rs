pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::{RatesError, StoredRate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use disk::FjallRateStore;
use memory::MemoryRateStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Name of the partition holding one row per currency code.
pub const CURRENCIES_PARTITION: &str = "currencies";

/// Durable table of the latest known rate per currency code.
///
/// `char_code` identifies at most one row. Each `upsert` replaces the whole
/// row in one write, so readers never see a half-updated row.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Inserts the row when the code is new, otherwise replaces name and value in place.
    async fn upsert(
        &self,
        char_code: &str,
        display_name: &str,
        value: Decimal,
    ) -> Result<(), RatesError>;

    async fn get(&self, char_code: &str) -> Result<StoredRate, RatesError>;

    /// All rows, ordered by code.
    async fn list(&self) -> Result<Vec<StoredRate>, RatesError>;

    /// Flushes pending writes to durable storage.
    async fn persist(&self) -> Result<(), RatesError> {
        Ok(())
    }
}

/// Opens the store selected by the config. Disk-backed unless `storage.in_memory` is set.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn RateStore>> {
    if config.storage.in_memory {
        info!("Using in-memory rate store");
        return Ok(Arc::new(MemoryRateStore::new()));
    }

    let path = config.default_data_path()?.join("store");
    let store = FjallRateStore::open(&path)
        .with_context(|| format!("Failed to open rate store at {}", path.display()))?;
    info!("Opened rate store at {}", path.display());
    Ok(Arc::new(store))
}
