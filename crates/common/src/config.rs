use std::time::Duration;

use crate::queue::MAX_QUEUE_CAPACITY;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Consumer API key used for the client-credentials token exchange
    pub consumer_api_key: String,

    /// Consumer API secret paired with `consumer_api_key`
    pub consumer_api_secret: String,

    /// Chat webhook that receives one POST per notification
    pub webhook_url: String,

    /// Identifier of the list whose timeline is relayed
    pub list_id: u64,

    /// Whether reposts are requested from the list timeline (default: true)
    pub include_reposts: bool,

    /// Base URL of the feed API, also used for the token endpoint
    pub api_base_url: String,

    /// Delay between the end of one fetch cycle and the start of the next (default: 60)
    pub poll_interval_secs: u64,

    /// Maximum wait of a single publisher dequeue (default: 10)
    pub publish_poll_timeout_secs: u64,

    /// Capacity of the notification queue (default: 100000)
    pub queue_capacity: usize,

    /// Number of items requested per fetch (default: 1000)
    pub fetch_page_size: u32,

    /// Per-request timeout of the HTTP clients (default: 30)
    pub http_timeout_secs: u64,
}

pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Every key is tried verbatim first and then in lowercase, so values can
    /// come from either `WEBHOOK_URL` or `webhook_url`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).or_else(|| lookup(&key.to_lowercase()));
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{key} environment variable is required"))
        };

        let queue_capacity: usize = var("QUEUE_CAPACITY")
            .unwrap_or_else(|| "100000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("QUEUE_CAPACITY must be a valid usize"))?;
        if queue_capacity == 0 {
            anyhow::bail!("QUEUE_CAPACITY must be greater than zero");
        }
        if queue_capacity > MAX_QUEUE_CAPACITY {
            anyhow::bail!("QUEUE_CAPACITY must not exceed {MAX_QUEUE_CAPACITY}");
        }

        Ok(Self {
            consumer_api_key: required("CONSUMER_API_KEY")?,
            consumer_api_secret: required("CONSUMER_API_SECRET_KEY")?,
            webhook_url: required("WEBHOOK_URL")?,
            list_id: required("TW_LIST_ID")?
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("TW_LIST_ID must be a valid u64"))?,
            include_reposts: parse_flag(var("INCLUDE_RTS").as_deref()),
            api_base_url: var("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_interval_secs: var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|| "60".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_SECS must be a valid u64"))?,
            publish_poll_timeout_secs: var("PUBLISH_POLL_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PUBLISH_POLL_TIMEOUT_SECS must be a valid u64"))?,
            queue_capacity,
            fetch_page_size: var("FETCH_PAGE_SIZE")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("FETCH_PAGE_SIZE must be a valid u32"))?,
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a valid u64"))?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn publish_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_poll_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Boolean flag that stays enabled unless explicitly set to a false-like value.
fn parse_flag(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) => !matches!(v.as_str(), "false" | "0" | "no" | "off"),
        None => true,
    }
}
