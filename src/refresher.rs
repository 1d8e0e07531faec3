//! Background loop that keeps the rate store in sync with the upstream feed.

use crate::core::config::RefreshConfig;
use crate::core::{RatesError, Snapshot};
use crate::providers::util::with_retry;
use crate::providers::{FeedSource, parse_snapshot};
use crate::store::RateStore;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Idle,
    Fetching,
    Parsing,
    Upserting,
}

impl RefreshStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStage::Idle => "idle",
            RefreshStage::Fetching => "fetching",
            RefreshStage::Parsing => "parsing",
            RefreshStage::Upserting => "upserting",
        }
    }
}

pub struct Refresher {
    source: Arc<dyn FeedSource>,
    store: Arc<dyn RateStore>,
    interval: Duration,
    retries: usize,
    retry_delay_ms: u64,
    stage: watch::Sender<RefreshStage>,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn FeedSource>,
        store: Arc<dyn RateStore>,
        config: &RefreshConfig,
    ) -> Self {
        let (stage, _) = watch::channel(RefreshStage::Idle);
        Self {
            source,
            store,
            interval: config.interval(),
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
            stage,
        }
    }

    /// Observes stage transitions of the running loop.
    pub fn subscribe(&self) -> watch::Receiver<RefreshStage> {
        self.stage.subscribe()
    }

    fn enter(&self, stage: RefreshStage) {
        debug!(stage = stage.as_str(), "Refresher stage");
        self.stage.send_replace(stage);
    }

    async fn fetch_and_parse(&self) -> Result<Snapshot, RatesError> {
        self.enter(RefreshStage::Fetching);
        let raw = self.source.fetch().await?;
        self.enter(RefreshStage::Parsing);
        parse_snapshot(&raw)
    }

    /// Runs one fetch, parse and upsert pass. Returns the number of rows written.
    ///
    /// Nothing is written unless the whole document parsed.
    #[instrument(name = "RefreshCycle", skip(self))]
    pub async fn run_cycle(&self) -> Result<usize, RatesError> {
        let result = self.refresh().await;
        self.enter(RefreshStage::Idle);
        result
    }

    async fn refresh(&self) -> Result<usize, RatesError> {
        let snapshot =
            with_retry(|| self.fetch_and_parse(), self.retries, self.retry_delay_ms).await?;

        self.enter(RefreshStage::Upserting);
        let records = snapshot.records();
        try_join_all(records.iter().map(|record| {
            self.store
                .upsert(&record.char_code, &record.display_name, record.value)
        }))
        .await?;
        self.store.persist().await?;

        Ok(records.len())
    }

    /// Loops until `shutdown` flips to true or its sender is dropped.
    ///
    /// A cycle in flight when shutdown arrives is dropped, which aborts the
    /// outstanding HTTP request.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval = ?self.interval, "Refresher started");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = self.run_cycle() => match result {
                    Ok(count) => info!(count, "Refresh cycle stored rates"),
                    Err(e) => warn!(kind = e.kind(), error = %e, "Refresh cycle failed"),
                },
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        self.enter(RefreshStage::Idle);
        info!("Refresher stopped");
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
