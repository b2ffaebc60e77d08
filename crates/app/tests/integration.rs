//! End-to-end tests: token exchange, list polling and webhook delivery all
//! served by one local `wiremock` server.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use relay_common::config::AppConfig;

const LIST_PATH: &str = "/1.1/lists/statuses.json";

// ============================================================
// Helpers
// ============================================================

fn test_config(server: &MockServer) -> AppConfig {
    let env = HashMap::from([
        ("CONSUMER_API_KEY", "key".to_string()),
        ("CONSUMER_API_SECRET_KEY", "secret".to_string()),
        ("WEBHOOK_URL", format!("{}/hook", server.uri())),
        ("TW_LIST_ID", "42".to_string()),
        ("API_BASE_URL", server.uri()),
        ("POLL_INTERVAL_SECS", "1".to_string()),
        ("PUBLISH_POLL_TIMEOUT_SECS", "1".to_string()),
        ("HTTP_TIMEOUT_SECS", "5".to_string()),
    ]);
    AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap()
}

fn items(ids: &[u64]) -> serde_json::Value {
    serde_json::Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "text": format!("post {}", id),
                    "user": { "screen_name": "alice", "name": "Alice" }
                })
            })
            .collect(),
    )
}

async fn mount_token(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "access_token": "bearer-1" })),
        )
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, since_id: Option<u64>, ids: &[u64]) {
    let mock = Mock::given(method("GET")).and(path(LIST_PATH));
    let mock = match since_id {
        Some(id) => mock.and(query_param("since_id", id.to_string())),
        None => mock.and(query_param_is_missing("since_id")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(items(ids)))
        .mount(server)
        .await;
}

async fn mount_webhook(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, target: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == target)
        .collect()
}

async fn wait_for_requests(server: &MockServer, target: &str, count: usize) -> Vec<Request> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let seen = requests_to(server, target).await;
        if seen.len() >= count || Instant::now() > deadline {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn webhook_text(request: &Request) -> String {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    body["text"].as_str().unwrap().to_string()
}

// ============================================================
// Startup
// ============================================================

#[tokio::test]
async fn test_startup_fails_when_token_rejected() {
    let server = MockServer::start().await;
    mount_token(&server, 401).await;

    let err = relay_app::start(&test_config(&server)).await.err().unwrap();
    assert!(format!("{err:#}").contains("bearer token"));
    assert!(requests_to(&server, LIST_PATH).await.is_empty());
}

#[tokio::test]
async fn test_startup_fails_when_initial_fetch_fails() {
    let server = MockServer::start().await;
    mount_token(&server, 200).await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = relay_app::start(&test_config(&server)).await.err().unwrap();
    assert!(format!("{err:#}").contains("error initializing to poll list 42"));
}

// ============================================================
// Pipeline
// ============================================================

#[tokio::test]
async fn test_new_items_are_relayed_in_order_exactly_once() {
    let server = MockServer::start().await;
    mount_token(&server, 200).await;
    mount_page(&server, None, &[1, 2]).await;
    mount_page(&server, Some(2), &[5, 3, 3, 7]).await;
    mount_page(&server, Some(7), &[]).await;
    mount_webhook(&server).await;

    let relay = relay_app::start(&test_config(&server)).await.unwrap();

    let delivered = wait_for_requests(&server, "/hook", 3).await;
    let texts: Vec<String> = delivered.iter().map(webhook_text).collect();
    assert_eq!(texts.len(), 3, "expected three deliveries, got {texts:?}");
    for (text, id) in texts.iter().zip([3, 5, 7]) {
        assert!(text.starts_with(&format!("https://twitter.com/alice/status/{id}\n")));
        assert!(text.ends_with(&format!("post {id}")));
    }

    // Later cycles ask for items after 7 and relay nothing new.
    wait_for_requests(&server, LIST_PATH, 3).await;
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(requests_to(&server, "/hook").await.len(), 3);

    relay.shutdown();
    let stats = tokio::time::timeout(Duration::from_secs(5), relay.join())
        .await
        .expect("relay did not stop")
        .unwrap();
    assert_eq!(stats.delivered, 3);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_shutdown_is_idempotent_and_stops_polling() {
    let server = MockServer::start().await;
    mount_token(&server, 200).await;
    mount_page(&server, None, &[10]).await;
    mount_page(&server, Some(10), &[]).await;
    mount_webhook(&server).await;

    let relay = relay_app::start(&test_config(&server)).await.unwrap();
    assert!(!relay.is_finished());

    relay.shutdown();
    relay.shutdown();
    tokio::time::timeout(Duration::from_secs(5), relay.join())
        .await
        .expect("relay did not stop")
        .unwrap();

    let polls = requests_to(&server, LIST_PATH).await.len();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(requests_to(&server, LIST_PATH).await.len(), polls);
    assert!(requests_to(&server, "/hook").await.is_empty());
}
