use crate::core::{RatesError, StoredRate, normalize_code};
use crate::store::{CURRENCIES_PARTITION, RateStore};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

/// Rate store backed by a fjall keyspace.
///
/// Rows are JSON-encoded [`StoredRate`] values keyed by the upper-cased code.
/// A single-key insert is atomic, which is what makes `upsert` row-atomic.
pub struct FjallRateStore {
    keyspace: Keyspace,
    rows: PartitionHandle,
}

impl FjallRateStore {
    /// Opens (or creates) the keyspace and the currencies partition.
    pub fn open(path: &Path) -> Result<Self, RatesError> {
        std::fs::create_dir_all(path)
            .map_err(|e| RatesError::Store(format!("{}: {e}", path.display())))?;

        let keyspace = Config::new(path).open()?;
        let rows = keyspace.open_partition(CURRENCIES_PARTITION, PartitionCreateOptions::default())?;
        Ok(Self { keyspace, rows })
    }

    fn decode(bytes: &[u8]) -> Result<StoredRate, RatesError> {
        serde_json::from_slice(bytes)
            .map_err(|e| RatesError::Store(format!("Corrupt rate row: {e}")))
    }
}

#[async_trait]
impl RateStore for FjallRateStore {
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
        let encoded =
            serde_json::to_vec(&row).map_err(|e| RatesError::Store(e.to_string()))?;

        self.rows.insert(key.as_bytes(), encoded)?;
        debug!("Store UPSERT for code: {}", key);
        Ok(())
    }

    async fn get(&self, char_code: &str) -> Result<StoredRate, RatesError> {
        let key = normalize_code(char_code);
        match self.rows.get(key.as_bytes())? {
            Some(bytes) => Self::decode(&bytes),
            None => {
                debug!("Store MISS for code: {}", key);
                Err(RatesError::NotFound(key))
            }
        }
    }

    async fn list(&self) -> Result<Vec<StoredRate>, RatesError> {
        // Keys are ordered bytewise, so the scan is already sorted by code.
        self.rows
            .iter()
            .map(|item| {
                let (_key, value) = item?;
                Self::decode(&value)
            })
            .collect()
    }

    async fn persist(&self) -> Result<(), RatesError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Store PERSIST");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fjall_store_upsert_get() {
        let dir = tempdir().unwrap();
        let store = FjallRateStore::open(dir.path()).unwrap();

        // Initially, store is empty
        assert!(store.get("USD").await.unwrap_err().is_not_found());

        store
            .upsert("usd", "US Dollar", Decimal::from_str("90.5").unwrap())
            .await
            .unwrap();

        let row = store.get("USD").await.unwrap();
        assert_eq!(row.char_code, "USD");
        assert_eq!(row.display_name, "US Dollar");
        assert_eq!(row.value, Decimal::from_str("90.5").unwrap());

        // Get a non-existent key
        assert!(store.get("ZZZ").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fjall_store_update_in_place() {
        let dir = tempdir().unwrap();
        let store = FjallRateStore::open(dir.path()).unwrap();

        store.upsert("EUR", "Euro", Decimal::ONE).await.unwrap();
        store
            .upsert("EUR", "Euro (EMU)", Decimal::from_str("98.1234").unwrap())
            .await
            .unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, "Euro (EMU)");
        assert_eq!(rows[0].value, Decimal::from_str("98.1234").unwrap());
    }

    #[tokio::test]
    async fn test_fjall_store_upsert_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FjallRateStore::open(dir.path()).unwrap();
        let value = Decimal::from_str("0.612").unwrap();

        store.upsert("JPY", "Japanese Yen", value).await.unwrap();
        let once = store.list().await.unwrap();
        store.upsert("JPY", "Japanese Yen", value).await.unwrap();
        assert_eq!(store.list().await.unwrap(), once);
    }

    #[tokio::test]
    async fn test_fjall_store_list_sorted_after_persist() {
        let dir = tempdir().unwrap();
        let store = FjallRateStore::open(dir.path()).unwrap();
        store.upsert("USD", "US Dollar", Decimal::TWO).await.unwrap();
        store.upsert("AUD", "Australian Dollar", Decimal::ONE).await.unwrap();
        store.persist().await.unwrap();

        let codes: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.char_code)
            .collect();
        assert_eq!(codes, vec!["AUD", "USD"]);
        assert_eq!(store.get("usd").await.unwrap().value, Decimal::TWO);
    }

    #[tokio::test]
    async fn test_fjall_store_rows_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FjallRateStore::open(dir.path()).unwrap();
            store
                .upsert("USD", "US Dollar", Decimal::from_str("90.5").unwrap())
                .await
                .unwrap();
            store.persist().await.unwrap();
        }

        let reopened = FjallRateStore::open(dir.path()).unwrap();
        let row = reopened.get("USD").await.unwrap();
        assert_eq!(row.display_name, "US Dollar");
        assert_eq!(row.value, Decimal::from_str("90.5").unwrap());
    }
}
