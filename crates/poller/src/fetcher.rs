use std::collections::BTreeMap;

use relay_common::error::RelayError;
use relay_common::types::{Credential, RawItem};

use crate::cursor::Cursor;

/// Default number of items requested per fetch.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Incremental reader of a single list timeline.
///
/// Owns the cursor: each successful fetch asks only for items newer than the
/// watermark and advances it to the newest identifier returned.
pub struct FeedFetcher {
    client: reqwest::Client,
    endpoint: String,
    list_id: u64,
    page_size: u32,
    include_reposts: bool,
    credential: Credential,
    cursor: Cursor,
}

impl FeedFetcher {
    pub fn new(
        client: reqwest::Client,
        api_base_url: &str,
        list_id: u64,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/1.1/lists/statuses.json",
                api_base_url.trim_end_matches('/')
            ),
            list_id,
            page_size: DEFAULT_PAGE_SIZE,
            include_reposts: true,
            credential,
            cursor: Cursor::unset(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_reposts(mut self, include_reposts: bool) -> Self {
        self.include_reposts = include_reposts;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn list_id(&self) -> u64 {
        self.list_id
    }

    /// Query parameters for the next request.
    ///
    /// Without a cursor the most recent page is requested with no lower bound.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("list_id", self.list_id.to_string()),
            ("count", self.page_size.to_string()),
        ];
        if let Some(since_id) = self.cursor.get() {
            if self.include_reposts {
                query.push(("include_rts", "true".to_string()));
            }
            query.push(("since_id", since_id.to_string()));
        }
        query
    }

    /// Fetch items newer than the cursor, propagating any failure.
    ///
    /// The cursor is left untouched on error and on an empty page.
    pub async fn try_fetch_new(&mut self) -> Result<Vec<RawItem>, RelayError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .bearer_auth(self.credential.token())
            .query(&self.query())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let items: Vec<RawItem> = serde_json::from_slice(&body)?;
        let received = items.len();
        let batch = order_batch(items);

        if let Some(newest) = batch.last() {
            self.cursor.advance(newest.id);
        }

        tracing::debug!(
            list_id = self.list_id,
            received,
            new_items = batch.len(),
            cursor = %self.cursor,
            "Fetched list timeline"
        );

        Ok(batch)
    }

    /// Fetch items newer than the cursor, treating every failure as transient.
    ///
    /// Errors are logged and yield an empty batch so the next cycle retries the
    /// same window.
    pub async fn fetch_new(&mut self) -> Vec<RawItem> {
        match self.try_fetch_new().await {
            Ok(batch) => batch,
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(
                    list_id = self.list_id,
                    cursor = %self.cursor,
                    credential_acquired_at = %self.credential.acquired_at,
                    error = %e,
                    "List fetch rejected, bearer token may have expired"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    list_id = self.list_id,
                    cursor = %self.cursor,
                    error = %e,
                    "Error getting list statuses, will retry next cycle"
                );
                Vec::new()
            }
        }
    }
}

/// Deduplicate by identifier and sort ascending.
///
/// Pages may overlap or arrive out of order; the first copy of an identifier
/// wins.
pub fn order_batch(items: Vec<RawItem>) -> Vec<RawItem> {
    let mut by_id = BTreeMap::new();
    for item in items {
        by_id.entry(item.id).or_insert(item);
    }
    by_id.into_values().collect()
}
