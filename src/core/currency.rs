//! Currency records, snapshots and stored rows

use crate::core::error::RatesError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Code of the reference currency all feed values are quoted against.
pub const DOMESTIC_CODE: &str = "RUB";
const DOMESTIC_NAME: &str = "Russian ruble";

/// Codes are compared and stored upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub numeric_code: u32,
    pub char_code: String,
    pub nominal: u32,
    pub display_name: String,
    /// Price of `nominal` units in the domestic currency.
    pub value: Decimal,
}

impl CurrencyRecord {
    /// Synthetic identity record for the domestic currency, which the feed never lists.
    pub fn domestic() -> Self {
        CurrencyRecord {
            numeric_code: 0,
            char_code: DOMESTIC_CODE.to_string(),
            nominal: 1,
            display_name: DOMESTIC_NAME.to_string(),
            value: Decimal::ONE,
        }
    }

    pub fn is_domestic_code(code: &str) -> bool {
        code.trim().eq_ignore_ascii_case(DOMESTIC_CODE)
    }

    /// Per-unit exchange rate, `value / nominal`.
    ///
    /// `nominal` is never zero for records that came through [`Snapshot::new`].
    pub fn rate_to_domestic(&self) -> Decimal {
        debug_assert!(self.nominal != 0, "zero nominal for {}", self.char_code);
        self.value / Decimal::from(self.nominal)
    }
}

/// One fetched batch of records. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    date: Option<NaiveDate>,
    records: Vec<CurrencyRecord>,
}

impl Snapshot {
    pub fn new(date: Option<NaiveDate>, records: Vec<CurrencyRecord>) -> Result<Self, RatesError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.nominal == 0 {
                return Err(RatesError::Parse(format!(
                    "Zero nominal for currency: {}",
                    record.char_code
                )));
            }
            if record.value.is_sign_negative() && !record.value.is_zero() {
                return Err(RatesError::Parse(format!(
                    "Negative value for currency: {}",
                    record.char_code
                )));
            }
            if !seen.insert(normalize_code(&record.char_code)) {
                return Err(RatesError::Parse(format!(
                    "Duplicate currency code: {}",
                    record.char_code
                )));
            }
        }
        Ok(Self { date, records })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn records(&self) -> &[CurrencyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CurrencyRecord> {
        self.records
    }
}

/// Latest known rate for one currency code, as persisted by the rate store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRate {
    pub char_code: String,
    pub display_name: String,
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(code: &str, nominal: u32, value: &str) -> CurrencyRecord {
        CurrencyRecord {
            numeric_code: 1,
            char_code: code.to_string(),
            nominal,
            display_name: code.to_string(),
            value: Decimal::from_str(value).unwrap(),
        }
    }

    #[test]
    fn test_domestic_record() {
        let rub = CurrencyRecord::domestic();
        assert_eq!(rub.numeric_code, 0);
        assert_eq!(rub.nominal, 1);
        assert_eq!(rub.rate_to_domestic(), Decimal::ONE);
        assert!(CurrencyRecord::is_domestic_code("rub"));
        assert!(CurrencyRecord::is_domestic_code(" RUB "));
        assert!(!CurrencyRecord::is_domestic_code("USD"));
    }

    #[test]
    fn test_rate_to_domestic_divides_by_nominal() {
        let jpy = record("JPY", 100, "61.2");
        assert_eq!(jpy.rate_to_domestic(), Decimal::from_str("0.612").unwrap());
    }

    #[test]
    fn test_snapshot_rejects_duplicates_case_insensitively() {
        let result = Snapshot::new(None, vec![record("USD", 1, "90.5"), record("usd", 1, "91")]);
        assert!(matches!(result, Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_snapshot_rejects_zero_nominal() {
        let result = Snapshot::new(None, vec![record("USD", 0, "90.5")]);
        assert!(matches!(result, Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_snapshot_rejects_negative_value() {
        let result = Snapshot::new(None, vec![record("USD", 1, "-1")]);
        assert!(matches!(result, Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" usd"), "USD");
    }
}
