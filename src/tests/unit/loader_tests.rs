//! HTTP catalog loader tests.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::CatalogConfig;
use crate::core::stats::{
    fetch_catalog, load_catalog, CatalogResponse, HttpCatalogSource, Resolution, StatError,
    StatRegistry,
};
use crate::tests::common::{catalog_payload, catalog_response, ScriptedSource};

const STATS_PATH: &str = "/api/trade/data/stats";

fn source_for(server: &MockServer) -> HttpCatalogSource {
    let config = CatalogConfig {
        url: format!("{}{}", server.uri(), STATS_PATH),
        ..CatalogConfig::default()
    };
    HttpCatalogSource::from_config(&config).expect("client should build")
}

async fn serve(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_load_flattens_and_installs() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(200).set_body_json(catalog_payload())).await;

    let registry = StatRegistry::default();
    let snapshot = load_catalog(&source_for(&server), &registry).await.unwrap();

    assert_eq!(snapshot.len(), 11);
    assert_eq!(snapshot.catalog()[0].id, "explicit.stat_3299347043");
    assert_eq!(snapshot.catalog()[7].category, "Implicit");
    assert_eq!(snapshot.catalog()[10].category, "Crafted");
    assert_eq!(
        registry.resolve("+45% increased Fire Damage").unwrap(),
        Resolution::Exact {
            id: "explicit.stat_3962278098".into()
        }
    );
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .and(header("user-agent", "statmatch-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let config = CatalogConfig {
        url: format!("{}{}", server.uri(), STATS_PATH),
        user_agent: "statmatch-test/1.0".to_string(),
        ..CatalogConfig::default()
    };
    let source = HttpCatalogSource::from_config(&config).unwrap();
    assert_eq!(fetch_catalog(&source).await.unwrap().len(), 11);
}

#[tokio::test]
async fn test_reload_replaces_snapshot() {
    let registry = StatRegistry::default();
    let source = ScriptedSource::new(vec![
        Ok(catalog_response()),
        Ok(CatalogResponse::from_groups(vec![])),
    ]);

    let first = load_catalog(&source, &registry).await.unwrap();
    let second = load_catalog(&source, &registry).await.unwrap();

    assert_eq!(first.generation() + 1, second.generation());
    assert!(registry.snapshot().unwrap().is_empty());
    assert_eq!(
        registry.resolve("+45 to maximum Life").unwrap(),
        Resolution::NoMatch
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_error_payload_is_data_error() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "error": "Service unavailable" })),
    )
    .await;

    let err = fetch_catalog(&source_for(&server)).await.unwrap_err();
    assert!(matches!(err, StatError::Data(ref m) if m == "Service unavailable"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_error_payload_wins_over_status() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 3, "message": "Rate limit exceeded" }
        })),
    )
    .await;

    let err = fetch_catalog(&source_for(&server)).await.unwrap_err();
    assert!(matches!(err, StatError::Data(ref m) if m == "Rate limit exceeded (code 3)"));
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(500).set_body_string("Internal Server Error")).await;

    let err = fetch_catalog(&source_for(&server)).await.unwrap_err();
    assert!(matches!(err, StatError::Fetch(ref m) if m.contains("500")));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_data_error() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(200).set_body_string("<html>maintenance</html>")).await;

    let err = fetch_catalog(&source_for(&server)).await.unwrap_err();
    assert!(matches!(err, StatError::Data(_)));
}

#[tokio::test]
async fn test_missing_result_is_data_error() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let err = fetch_catalog(&source_for(&server)).await.unwrap_err();
    assert!(matches!(err, StatError::Data(_)));
}

#[tokio::test]
async fn test_timeout_is_fetch_error() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(catalog_payload())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = CatalogConfig {
        url: format!("{}{}", server.uri(), STATS_PATH),
        timeout_secs: 1,
        ..CatalogConfig::default()
    };
    let source = HttpCatalogSource::from_config(&config).unwrap();
    let err = fetch_catalog(&source).await.unwrap_err();
    assert!(matches!(err, StatError::Fetch(_)));
}

#[tokio::test]
async fn test_unreachable_source_is_fetch_error() {
    let server = MockServer::start().await;
    let source = source_for(&server);
    drop(server);

    let err = fetch_catalog(&source).await.unwrap_err();
    assert!(err.is_retryable());
}

// =============================================================================
// Registry State
// =============================================================================

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let registry = StatRegistry::default();
    let source = ScriptedSource::new(vec![
        Ok(catalog_response()),
        Err(StatError::Fetch("connection reset".into())),
        Ok(serde_json::from_value(json!({ "error": "Maintenance" })).unwrap()),
    ]);

    let installed = load_catalog(&source, &registry).await.unwrap();
    assert!(load_catalog(&source, &registry).await.is_err());
    assert!(matches!(
        load_catalog(&source, &registry).await,
        Err(StatError::Data(_))
    ));

    let current = registry.snapshot().unwrap();
    assert_eq!(current.generation(), installed.generation());
    assert_eq!(current.len(), 11);
}

#[tokio::test]
async fn test_failed_first_load_leaves_registry_empty() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(503)).await;

    let registry = StatRegistry::default();
    assert!(load_catalog(&source_for(&server), &registry).await.is_err());
    assert!(matches!(
        registry.resolve("+45 to maximum Life"),
        Err(StatError::NotInitialized)
    ));
}

#[tokio::test]
async fn test_cancelled_load_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "result": [] }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let registry = StatRegistry::default();
    let installed = load_catalog(&ScriptedSource::new(vec![Ok(catalog_response())]), &registry)
        .await
        .unwrap();

    let source = source_for(&server);
    let outcome = tokio::time::timeout(
        Duration::from_millis(200),
        load_catalog(&source, &registry),
    )
    .await;
    assert!(outcome.is_err());

    assert_eq!(
        registry.snapshot().unwrap().generation(),
        installed.generation()
    );
}
