//! ListRelay lifecycle: startup, background tasks and shutdown.
//!
//! Startup acquires the bearer token and performs the first list fetch to
//! establish the cursor; either failing aborts startup. Two tasks are then
//! spawned, the fetch scheduler and the publisher worker, coupled only by the
//! notification queue.

use anyhow::Context;
use tokio::task::JoinHandle;

use relay_common::config::AppConfig;
use relay_common::queue::notification_queue;
use relay_common::shutdown::Shutdown;
use relay_engine::MessageFormatter;
use relay_notifier::{DeliveryStats, PublisherWorker, WebhookClient, WebhookSink};
use relay_poller::{ClientCredentials, CredentialSource, FeedFetcher, FetchCycle, Scheduler};

/// Build the HTTP client shared by the token exchange, the fetcher and the webhook.
pub fn http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.http_timeout())
        .user_agent(concat!("list-relay/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Start the relay with the production credential source and webhook.
pub async fn start(config: &AppConfig) -> anyhow::Result<RelayHandle> {
    let client = http_client(config)?;
    let credentials = ClientCredentials::new(
        client.clone(),
        &config.api_base_url,
        &config.consumer_api_key,
        &config.consumer_api_secret,
    );
    let sink = WebhookClient::new(client.clone(), &config.webhook_url);
    start_with(config, client, &credentials, sink).await
}

/// Start the relay with explicit collaborators.
pub async fn start_with<C, S>(
    config: &AppConfig,
    client: reqwest::Client,
    credentials: &C,
    sink: S,
) -> anyhow::Result<RelayHandle>
where
    C: CredentialSource + ?Sized,
    S: WebhookSink + 'static,
{
    let credential = credentials
        .acquire()
        .await
        .context("failed to obtain bearer token")?;

    tracing::info!(list_id = config.list_id, "Initializing list polling");

    let mut fetcher = FeedFetcher::new(client, &config.api_base_url, config.list_id, credential)
        .with_page_size(config.fetch_page_size)
        .with_reposts(config.include_reposts);

    // Items already on the list at startup only establish the cursor.
    let initial = fetcher
        .try_fetch_new()
        .await
        .with_context(|| format!("error initializing to poll list {}", config.list_id))?;

    tracing::info!(
        list_id = config.list_id,
        skipped = initial.len(),
        cursor = %fetcher.cursor(),
        "Initialized list polling"
    );

    let (sender, receiver) = notification_queue(config.queue_capacity);
    let shutdown = Shutdown::new();

    let cycle = FetchCycle::new(fetcher, MessageFormatter::new(), sender);
    let scheduler =
        tokio::spawn(Scheduler::new(cycle, config.poll_interval()).run(shutdown.subscribe()));

    let publisher = tokio::spawn(
        PublisherWorker::new(receiver, sink)
            .with_poll_timeout(config.publish_poll_timeout())
            .run(shutdown.subscribe()),
    );

    Ok(RelayHandle {
        shutdown,
        scheduler,
        publisher,
    })
}

/// Handle to a running relay.
pub struct RelayHandle {
    shutdown: Shutdown,
    scheduler: JoinHandle<()>,
    publisher: JoinHandle<DeliveryStats>,
}

impl RelayHandle {
    /// Stop scheduling fetch cycles and let the publisher exit. Idempotent.
    ///
    /// Buffered notifications that were not yet delivered are dropped.
    pub fn shutdown(&self) {
        if !self.shutdown.is_triggered() {
            tracing::info!("Shutdown requested");
        }
        self.shutdown.trigger();
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished() && self.publisher.is_finished()
    }

    /// Wait for both tasks to exit.
    pub async fn join(self) -> anyhow::Result<DeliveryStats> {
        self.scheduler.await.context("scheduler task failed")?;
        let stats = self.publisher.await.context("publisher task failed")?;
        Ok(stats)
    }
}
