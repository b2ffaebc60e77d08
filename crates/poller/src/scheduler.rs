//! Fixed-delay fetch cycles.
//!
//! A cycle fetches new items, formats them and enqueues the notifications in
//! ascending identifier order. Cycles never overlap: the next one is scheduled
//! only after the previous one, including any wait on a full queue, has
//! finished.

use std::time::Duration;

use relay_common::error::RelayError;
use relay_common::queue::NotificationSender;
use relay_common::shutdown::ShutdownSignal;
use relay_engine::MessageFormatter;

use crate::fetcher::FeedFetcher;

/// One fetch → format → enqueue pass.
pub struct FetchCycle {
    fetcher: FeedFetcher,
    formatter: MessageFormatter,
    sender: NotificationSender,
}

impl FetchCycle {
    pub fn new(fetcher: FeedFetcher, formatter: MessageFormatter, sender: NotificationSender) -> Self {
        Self {
            fetcher,
            formatter,
            sender,
        }
    }

    pub fn fetcher(&self) -> &FeedFetcher {
        &self.fetcher
    }

    /// Run one cycle, returning the number of notifications enqueued.
    ///
    /// Fetch errors are absorbed by the fetcher; only a closed queue fails.
    pub async fn run_once(&mut self) -> Result<usize, RelayError> {
        let items = self.fetcher.fetch_new().await;
        let count = items.len();

        for item in &items {
            self.sender.push(self.formatter.format(item)).await?;
        }

        if count > 0 {
            tracing::info!(
                list_id = self.fetcher.list_id(),
                enqueued = count,
                cursor = %self.fetcher.cursor(),
                queued = self.sender.len(),
                "Enqueued new list items"
            );
        }

        Ok(count)
    }
}

/// Drives [`FetchCycle`] with a fixed delay between cycles.
pub struct Scheduler {
    cycle: FetchCycle,
    delay: Duration,
}

impl Scheduler {
    pub fn new(cycle: FetchCycle, delay: Duration) -> Self {
        Self { cycle, delay }
    }

    /// Run until shutdown is requested.
    ///
    /// A cycle still in progress at shutdown (for example waiting on a full
    /// queue) is abandoned.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            list_id = self.cycle.fetcher().list_id(),
            delay_secs = self.delay.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = shutdown.triggered() => break,
                _ = tokio::time::sleep(self.delay) => {}
            }

            tokio::select! {
                _ = shutdown.triggered() => {
                    tracing::info!("Shutdown requested during fetch cycle, abandoning it");
                    break;
                }
                result = self.cycle.run_once() => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Notification queue closed, stopping scheduler");
                        break;
                    }
                }
            }
        }

        tracing::info!(cursor = %self.cycle.fetcher().cursor(), "Scheduler stopped");
    }
}
