//! Core domain types and ambient plumbing

pub mod config;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRecord, DOMESTIC_CODE, Snapshot, StoredRate, normalize_code};
pub use error::RatesError;
