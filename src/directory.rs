//! Point lookups and cross-currency conversion over one snapshot.

use crate::core::{CurrencyRecord, RatesError, Snapshot, normalize_code};
use crate::providers::{FeedSource, parse_snapshot};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Per-unit rate of `record` in the domestic currency, `value / nominal`.
pub fn rate_to_domestic(record: &CurrencyRecord) -> Decimal {
    record.rate_to_domestic()
}

#[derive(Debug, Clone)]
pub struct RateDirectory {
    date: Option<NaiveDate>,
    records: HashMap<String, CurrencyRecord>,
}

impl RateDirectory {
    pub fn new(snapshot: Snapshot) -> Self {
        let date = snapshot.date();
        let records = snapshot
            .into_records()
            .into_iter()
            .map(|record| (normalize_code(&record.char_code), record))
            .collect();
        Self { date, records }
    }

    /// Directory with no feed records; only the domestic code resolves.
    pub fn empty() -> Self {
        Self {
            date: None,
            records: HashMap::new(),
        }
    }

    /// Fetches and parses a fresh snapshot from `source`.
    #[instrument(name = "RateDirectoryLoad", skip(source))]
    pub async fn load(source: &dyn FeedSource) -> Result<Self, RatesError> {
        let raw = source.fetch().await?;
        let snapshot = parse_snapshot(&raw)?;
        debug!(records = snapshot.len(), "Loaded rate directory");
        Ok(Self::new(snapshot))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Case-insensitive lookup. The domestic code always resolves to the
    /// identity record without consulting the snapshot.
    pub fn lookup(&self, char_code: &str) -> Result<CurrencyRecord, RatesError> {
        if CurrencyRecord::is_domestic_code(char_code) {
            return Ok(CurrencyRecord::domestic());
        }
        let key = normalize_code(char_code);
        self.records
            .get(&key)
            .cloned()
            .ok_or(RatesError::NotFound(key))
    }

    /// A record with a zero rate cannot take part in a division and counts as unresolved.
    fn resolve_rate(&self, char_code: &str) -> Result<Decimal, RatesError> {
        let record = self.lookup(char_code)?;
        let rate = rate_to_domestic(&record);
        if rate.is_zero() {
            return Err(RatesError::NotFound(record.char_code));
        }
        Ok(rate)
    }

    /// Amount of `to_code` equivalent to one unit of `from_code`.
    pub fn convert(&self, from_code: &str, to_code: &str) -> Result<Decimal, RatesError> {
        let from_rate = self.resolve_rate(from_code)?;
        let to_rate = self.resolve_rate(to_code)?;
        from_rate.checked_div(to_rate).ok_or_else(|| {
            RatesError::OutOfRange(format!("{from_code} to {to_code} proportion"))
        })
    }
}
