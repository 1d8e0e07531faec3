//! Failure kinds shared by the fetch, parse, lookup and storage paths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatesError {
    /// Upstream returned a non-200 status or the request itself failed.
    #[error("Failed to fetch rates feed: {0}")]
    Fetch(String),

    /// The upstream document could not be turned into a snapshot.
    #[error("Failed to parse rates feed: {0}")]
    Parse(String),

    #[error("No currency found for code: {0}")]
    NotFound(String),

    #[error("Missing required parameters: {0}")]
    Validation(String),

    #[error("Rate store error: {0}")]
    Store(String),

    /// Decimal arithmetic left the representable range.
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl RatesError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RatesError::NotFound(_))
    }

    /// True for failures that originate upstream (network or document shape).
    pub fn is_upstream(&self) -> bool {
        matches!(self, RatesError::Fetch(_) | RatesError::Parse(_))
    }

    /// Short tag used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RatesError::Fetch(_) => "fetch",
            RatesError::Parse(_) => "parse",
            RatesError::NotFound(_) => "not_found",
            RatesError::Validation(_) => "validation",
            RatesError::Store(_) => "store",
            RatesError::OutOfRange(_) => "out_of_range",
        }
    }
}

impl From<reqwest::Error> for RatesError {
    fn from(e: reqwest::Error) -> Self {
        RatesError::Fetch(e.to_string())
    }
}

impl From<fjall::Error> for RatesError {
    fn from(e: fjall::Error) -> Self {
        RatesError::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(RatesError::NotFound("ZZZ".to_string()).is_not_found());
        assert!(RatesError::Fetch("503".to_string()).is_upstream());
        assert!(RatesError::Parse("bad".to_string()).is_upstream());
        assert!(!RatesError::Store("io".to_string()).is_upstream());
        assert_eq!(RatesError::Validation("amount".to_string()).kind(), "validation");
        assert_eq!(RatesError::OutOfRange("amount".to_string()).kind(), "out_of_range");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RatesError::NotFound("ZZZ".to_string()).to_string(),
            "No currency found for code: ZZZ"
        );
        assert_eq!(
            RatesError::Fetch("HTTP status 500 Internal Server Error".to_string()).to_string(),
            "Failed to fetch rates feed: HTTP status 500 Internal Server Error"
        );
    }
}
