use crate::core::{RatesError, StoredRate, normalize_code};
use crate::store::RateStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store using HashMap and Mutex
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    inner: Arc<Mutex<HashMap<String, StoredRate>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn upsert(
        &self,
        char_code: &str,
        display_name: &str,
        value: Decimal,
    ) -> Result<(), RatesError> {
        let key = normalize_code(char_code);
        let row = StoredRate {
            char_code: key.clone(),
            display_name: display_name.to_string(),
            value,
        };

        let mut rows = self.inner.lock().await;
        debug!("Store UPSERT for code: {}", key);
        rows.insert(key, row);
        Ok(())
    }

    async fn get(&self, char_code: &str) -> Result<StoredRate, RatesError> {
        let key = normalize_code(char_code);
        let rows = self.inner.lock().await;
        rows.get(&key)
            .cloned()
            .ok_or(RatesError::NotFound(key))
    }

    async fn list(&self) -> Result<Vec<StoredRate>, RatesError> {
        let rows = self.inner.lock().await;
        let mut all: Vec<StoredRate> = rows.values().cloned().collect();
        all.sort_by(|a, b| a.char_code.cmp(&b.char_code));
        Ok(all)
    }
}
