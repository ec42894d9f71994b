//! Shared helpers for infra integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chamados_core::{ActiveTicketTracker, KeyValueStore, Notifier, SystemClock, TicketLifecycle};
use chamados_infra::{MemoryKeyValueStore, TicketApiClient, TicketApiClientConfig, TracingNotifier};
use serde_json::{json, Value};

pub fn ticket_json(id: &str, status: &str, started_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "status": status,
        "startedAt": started_at,
        "ticketValue": "120,00",
        "client": { "name": "Oficina Central", "type": "PF" },
    })
}

/// Client pointed at a mock server, with a single attempt per request.
pub fn api_client(base_url: &str) -> TicketApiClient {
    TicketApiClient::new(TicketApiClientConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
        max_attempts: 1,
        token: Some("test-token".into()),
    })
    .expect("api client")
}

pub fn lifecycle(base_url: &str, store: &MemoryKeyValueStore) -> Arc<TicketLifecycle> {
    let store: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let tracker = Arc::new(ActiveTicketTracker::new(store, Arc::new(SystemClock)));
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());
    Arc::new(TicketLifecycle::new(Arc::new(api_client(base_url)), tracker, notifier))
}

/// Poll `condition` until it holds or the timeout expires.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition().await
}
