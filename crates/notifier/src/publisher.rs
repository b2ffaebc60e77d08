use std::time::Duration;

use relay_common::queue::{NotificationReceiver, Popped};
use relay_common::shutdown::ShutdownSignal;
use relay_common::types::Notification;

use crate::webhook::WebhookSink;

/// Default maximum wait of one dequeue.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Sole consumer of the notification queue.
pub struct PublisherWorker<S> {
    receiver: NotificationReceiver,
    sink: S,
    poll_timeout: Duration,
    stats: DeliveryStats,
}

impl<S: WebhookSink> PublisherWorker<S> {
    pub fn new(receiver: NotificationReceiver, sink: S) -> Self {
        Self {
            receiver,
            sink,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            stats: DeliveryStats::default(),
        }
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Drain the queue until shutdown or until the producer side is gone.
    ///
    /// A delivery already in flight when shutdown is requested completes
    /// first. Notifications still buffered at that point are discarded.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> DeliveryStats {
        tracing::info!(
            poll_timeout_secs = self.poll_timeout.as_secs(),
            "Publisher worker started"
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let popped = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                popped = self.receiver.pop(self.poll_timeout) => popped,
            };

            match popped {
                Popped::Item(notification) => self.publish(&notification).await,
                Popped::Empty => continue,
                Popped::Closed => {
                    tracing::info!("Notification queue closed");
                    break;
                }
            }
        }

        tracing::info!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            skipped = self.stats.skipped,
            discarded = self.receiver.len(),
            "Publisher worker stopped"
        );
        self.stats
    }

    async fn publish(&mut self, notification: &Notification) {
        if notification.text.trim().is_empty() {
            tracing::debug!("Skipping empty notification");
            self.stats.skipped += 1;
            return;
        }

        tracing::debug!(notification = %notification.text, "Publishing notification");
        match self.sink.deliver(notification).await {
            Ok(status) => {
                tracing::info!(status, "Notification delivered");
                self.stats.delivered += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notification delivery failed, dropping message");
                self.stats.failed += 1;
            }
        }
    }
}
