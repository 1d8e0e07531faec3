use crate::core::RatesError;
use crate::core::config::FeedConfig;
use crate::providers::FeedSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

/// HTTP client for the central bank daily-rates document.
///
/// Holds one `reqwest::Client`, so every fetch shares the same connection
/// pool. The pool is released when the last clone of this client is dropped.
#[derive(Clone)]
pub struct CbrFeedClient {
    url: String,
    client: reqwest::Client,
}

impl CbrFeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, RatesError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(CbrFeedClient {
            url: config.url(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for CbrFeedClient {
    #[instrument(name = "CbrFeedFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, RatesError> {
        debug!("Requesting daily rates from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RatesError::Fetch(format!("Request error: {} URL: {}", e, self.url)))?;

        if response.status() != StatusCode::OK {
            return Err(RatesError::Fetch(format!(
                "HTTP error: {} URL: {}",
                response.status(),
                self.url
            )));
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Received daily rates document");
        Ok(text)
    }
}
