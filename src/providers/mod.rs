pub mod cbr;
pub mod parser;
pub mod util;

use crate::core::RatesError;
use async_trait::async_trait;

pub use cbr::CbrFeedClient;
pub use parser::parse_snapshot;

/// Source of the raw daily-rates document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<String, RatesError>;
}
