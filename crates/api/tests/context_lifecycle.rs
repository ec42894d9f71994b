//! Integration tests for AppContext lifecycle
//!
//! Tests verify that AppContext can be created, started, and shut down, and
//! that the file-backed ledger survives a restart.

use std::time::Duration;

use chamados_core::KeyValueStore;
use chamados_domain::constants::ACTIVE_TICKETS_STORAGE_KEY;
use chamados_domain::{ChamadosError, Config};
use chamados_lib::context::AppContext;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STARTED: &str = "2024-03-01T11:00:00.000Z";

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "t1", "status": "INICIADO", "startedAt": STARTED },
            { "id": "t2", "status": "ABERTO" },
        ])))
        .mount(&server)
        .await;
    server
}

fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.max_attempts = 1;
    config.storage.path = Some(dir.path().join("store.json").to_string_lossy().to_string());
    config.tracking.elapsed_refresh_ms = 20;
    config.tracking.reconcile_interval_seconds = 1;
    config.tracking.server_refresh_seconds = 1;
    config
}

async fn wait_for_active(context: &AppContext, ticket_id: &str) -> bool {
    for _ in 0..200 {
        if context.tracker.is_active(ticket_id) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn test_context_start_seeds_and_persists_running_tickets() {
    let server = backend().await;
    let dir = TempDir::new().expect("failed to create temporary test directory");
    let context = AppContext::new_with_config(test_config(&server, &dir)).unwrap();

    context.start().await.unwrap();
    assert!(context.is_tracking().await);
    assert!(wait_for_active(&context, "t1").await, "running server ticket should be seeded");
    assert!(!context.tracker.is_active("t2"));

    let raw = context.store.get(ACTIVE_TICKETS_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), json!({ "t1": STARTED }));

    context.shutdown().await.unwrap();
    assert!(!context.is_tracking().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ledger_survives_restart() {
    let server = backend().await;
    let dir = TempDir::new().expect("failed to create temporary test directory");

    {
        let context = AppContext::new_with_config(test_config(&server, &dir)).unwrap();
        context.start().await.unwrap();
        assert!(wait_for_active(&context, "t1").await);
        context.shutdown().await.unwrap();
    }

    // Before any fetch, the persisted entry alone makes the ticket active.
    let context = AppContext::new_with_config(test_config(&server, &dir)).unwrap();
    let active = context.tracker.reconcile();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].ticket_id, "t1");
    assert_eq!(active[0].started_at, STARTED);

    let banner = context.banner();
    assert!(banner.is_visible());
    assert!(banner.tickets()[0].loading);
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let server = backend().await;
    let dir = TempDir::new().expect("failed to create temporary test directory");
    let context = AppContext::new_with_config(test_config(&server, &dir)).unwrap();

    context.start().await.unwrap();
    let err = context.start().await.unwrap_err();
    assert!(matches!(err, ChamadosError::Internal(msg) if msg.contains("already running")));

    context.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_without_start_is_ok() {
    let context = AppContext::new().unwrap();
    assert!(!context.is_tracking().await);
    context.shutdown().await.unwrap();
}
