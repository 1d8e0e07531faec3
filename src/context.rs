use crate::core::config::AppConfig;
use crate::providers::{CbrFeedClient, FeedSource};
use crate::refresher::Refresher;
use crate::store::{RateStore, open_store};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Long-lived handles shared by the refresher and the HTTP layer.
///
/// Built once at startup. `close` must run after the refresher has stopped so
/// that pending store writes are flushed before the feed client's connection
/// pool is released.
pub struct AppContext {
    config: AppConfig,
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn RateStore>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let feed = CbrFeedClient::new(&config.feed).context("Failed to build feed client")?;
        debug!("Feed client targets {}", feed.url());
        let store = open_store(&config)?;
        Ok(Self::with_parts(config, Arc::new(feed), store))
    }

    pub fn with_parts(
        config: AppConfig,
        feed: Arc<dyn FeedSource>,
        store: Arc<dyn RateStore>,
    ) -> Self {
        Self {
            config,
            feed,
            store,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn feed(&self) -> Arc<dyn FeedSource> {
        Arc::clone(&self.feed)
    }

    pub fn store(&self) -> Arc<dyn RateStore> {
        Arc::clone(&self.store)
    }

    pub fn refresher(&self) -> Refresher {
        Refresher::new(self.feed(), self.store(), &self.config.refresh)
    }

    /// Flushes the store and releases the shared handles.
    pub async fn close(self) -> Result<()> {
        self.store
            .persist()
            .await
            .context("Failed to persist rate store on shutdown")?;
        drop(self.feed);
        drop(self.store);
        info!("Application context closed");
        Ok(())
    }
}
