//! Summary client tests against a real in-process server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use pubscope_client::{SummaryClient, SummaryError, SummaryLoader, SummaryState};
use pubscope_core::{Publication, SummaryIndex, SummaryKey, RAW_OUTPUT_SECTION};
use pubscope_server::{create_router, AppState};

const SUMMARIES: &str = r#"{
    "25133378": {"summary": "Mice trained for orbit.", "key_findings": ["Tolerated housing"]},
    "PMC7998608": {"overview": "Stem cells in microgravity."}
}"#;

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn backend() -> String {
    let summaries = SummaryIndex::from_json_str(SUMMARIES, "test").unwrap();
    spawn(create_router(Arc::new(AppState::new(summaries)))).await
}

#[tokio::test]
async fn test_fetch_by_pmid_and_pmc() {
    let client = SummaryClient::new(&backend().await).unwrap();

    let summary = client
        .fetch(&SummaryKey::Pmid("25133378".to_string()))
        .await
        .unwrap();
    assert_eq!(summary.overview.as_deref(), Some("Mice trained for orbit."));
    assert_eq!(summary.key_findings, Some(vec!["Tolerated housing".to_string()]));

    let record = Publication::new("Stem cells", "", "").with_pmc_id("PMC7998608");
    let summary = client.fetch_for(&record).await.unwrap();
    assert_eq!(summary.overview.as_deref(), Some("Stem cells in microgravity."));
}

#[tokio::test]
async fn test_missing_summary_is_a_status_error() {
    let client = SummaryClient::new(&backend().await).unwrap();
    let err = client
        .fetch(&SummaryKey::Title("Unknown article".to_string()))
        .await
        .unwrap_err();

    match &err {
        SummaryError::Status { status, message } => {
            assert_eq!(*status, 404);
            assert!(message.contains("Unknown article"));
            assert!(!message.starts_with('{'));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Summary request failed (404)"));
}

#[tokio::test]
async fn test_lenient_bodies_and_rate_limits() {
    let router = Router::new()
        .route(
            "/api/summary",
            get(|| async { "```json\n{\"overview\": \"Fenced.\"}\n```" }),
        )
        .route("/other/api/summary", get(|| async { "plain prose, no JSON" }))
        .route(
            "/busy/api/summary",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route(
            "/broken/api/summary",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database exploded") }),
        );
    let base = spawn(router).await;
    let key = SummaryKey::Pmid("1".to_string());

    let fenced = SummaryClient::new(&base).unwrap().fetch(&key).await.unwrap();
    assert_eq!(fenced.overview.as_deref(), Some("Fenced."));

    let prose = SummaryClient::new(&format!("{}/other", base))
        .unwrap()
        .fetch(&key)
        .await
        .unwrap();
    assert_eq!(
        prose.sections.get(RAW_OUTPUT_SECTION).map(String::as_str),
        Some("plain prose, no JSON")
    );

    let busy = SummaryClient::new(&format!("{}/busy", base))
        .unwrap()
        .fetch(&key)
        .await;
    assert!(matches!(busy, Err(SummaryError::RateLimited)));

    let broken = SummaryClient::new(&format!("{}/broken", base))
        .unwrap()
        .fetch(&key)
        .await
        .unwrap_err();
    assert_eq!(
        broken.to_string(),
        "Summary request failed (500): database exploded"
    );
}

#[tokio::test]
async fn test_loader_ignores_superseded_loads() {
    let loader = SummaryLoader::new(SummaryClient::new(&backend().await).unwrap());
    let first = Publication::new("Mice", "", "25133378");
    let second = Publication::new("Stem cells", "", "").with_pmc_id("PMC7998608");

    // Both start before either finishes; only the later one may render.
    let (stale, fresh) = tokio::join!(loader.load(&first), loader.load(&second));
    assert_eq!(stale, None);
    let fresh = fresh.expect("latest load renders");
    assert_eq!(
        fresh.summary().and_then(|s| s.overview.as_deref()),
        Some("Stem cells in microgravity.")
    );
}

#[tokio::test]
async fn test_loader_shows_loading_until_finished() {
    let loader = SummaryLoader::new(SummaryClient::new(&backend().await).unwrap());
    let record = Publication::new("Mice", "", "25133378");

    let (ticket, pending) = loader.start();
    assert!(pending.is_loading());
    assert!(loader.requests().is_current(ticket));

    let state = loader.finish(ticket, &record).await.unwrap();
    assert_eq!(
        state.summary().and_then(|s| s.overview.as_deref()),
        Some("Mice trained for orbit.")
    );

    let (stale, _) = loader.start();
    let (_fresh, _) = loader.start();
    assert_eq!(loader.finish(stale, &record).await, None);
}

#[tokio::test]
async fn test_loader_reports_failures_and_cancel() {
    let loader = SummaryLoader::new(SummaryClient::new(&backend().await).unwrap());

    let state = loader.load(&Publication::new("Nope", "", "1")).await.unwrap();
    assert!(matches!(state, SummaryState::Failed(ref m) if m.contains("404")));

    let state = loader.load(&Publication::new("  ", "", "")).await.unwrap();
    assert_eq!(
        state.error(),
        Some("No identifier to request a summary for")
    );

    let ticket = loader.requests().begin();
    loader.cancel();
    let result = loader
        .client()
        .fetch(&SummaryKey::Pmid("25133378".to_string()))
        .await;
    assert!(result.is_ok());
    assert_eq!(loader.requests().resolve(ticket, result), None);
}
