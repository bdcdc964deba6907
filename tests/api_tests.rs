mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{CannedSearch, result, unreachable_scraper};
use demo_prep::api::{AppState, DEFAULT_SESSION_TTL, create_router};
use demo_prep::query_planner::QueryPlanner;
use demo_prep::vendor::VendorCatalog;

fn app(search: CannedSearch, output_dir: &std::path::Path) -> (Router, Arc<AppState<CannedSearch>>) {
    app_with_ttl(search, output_dir, DEFAULT_SESSION_TTL)
}

fn app_with_ttl(
    search: CannedSearch,
    output_dir: &std::path::Path,
    ttl: Duration,
) -> (Router, Arc<AppState<CannedSearch>>) {
    let state = Arc::new(
        AppState::new(
            search,
            unreachable_scraper(),
            VendorCatalog::default().with_max_checks(3),
            output_dir,
        )
        .with_session_ttl(ttl),
    );
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::disabled(), dir.path());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["web_search_enabled"], false);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_research_validation() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::new(), dir.path());

    let (status, body) = send(&app, post_json("/api/research", json!({"domain": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Domain is required");

    let (status, body) = send(
        &app,
        post_json("/api/research", json!({"domain": "acme.com", "contact_leads": "Jane"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "contact_leads must be an array");
}

#[tokio::test]
async fn test_research_requires_search() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::disabled(), dir.path());

    let (status, body) = send(&app, post_json("/api/research", json!({"domain": "acme.com"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("GOOGLE_API_KEY"));
}

#[tokio::test]
async fn test_continue_unknown_session() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::new(), dir.path());

    let (status, body) = send(
        &app,
        post_json("/api/continue", json!({"session_id": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No research session found");
}

#[tokio::test]
async fn test_full_flow_writes_downloadable_reports() {
    let dir = tempfile::tempdir().unwrap();
    let planner = QueryPlanner::new("Acme", "acme.com");
    let search = CannedSearch::new()
        .with_results(
            &planner.crunchbase(),
            vec![result(
                "Acme - Crunchbase Company Profile",
                "https://www.crunchbase.com/organization/acme",
                "Acme builds rockets.",
            )],
        )
        .with_results(
            &planner.vendor("CrowdStrike"),
            vec![result(
                "Acme standardizes on CrowdStrike",
                "https://news.test/acme",
                "Acme rolled out CrowdStrike Falcon.",
            )],
        );
    let (app, state) = app(search, dir.path());

    let (status, body) = send(
        &app,
        post_json(
            "/api/research",
            json!({
                "domain": "https://acme.com/",
                "contact_leads": [{"name": "Jane Smith", "title": "CISO", "email": ""}]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verification_needed");
    assert_eq!(body["data"]["company_name"], "Acme");
    assert_eq!(body["data"]["domain"], "acme.com");
    assert_eq!(
        body["data"]["company_info"]["ok"]["crunchbase"]["url"],
        "https://www.crunchbase.com/organization/acme"
    );
    assert!(body["data"]["website_info"]["skipped"]["failed"].is_string());
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(state.sessions.len(), 1);

    let (status, body) = send(
        &app,
        post_json(
            "/api/continue",
            json!({"session_id": session_id, "context": "rocket maker"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "complete");
    assert_eq!(body["data"]["company_context"], "rocket maker");
    assert_eq!(
        body["data"]["vendor_connections"]["ok"][0]["vendor"],
        "CrowdStrike"
    );
    assert_eq!(body["data"]["contact_leads"][0]["search_performed"], true);
    assert!(state.sessions.is_empty());

    let markdown = body["files"]["markdown"].as_str().unwrap();
    let pdf = body["files"]["pdf"].as_str().unwrap();
    assert!(markdown.starts_with("acme_") && markdown.ends_with(".md"));
    assert!(dir.path().join(markdown).exists());
    assert!(dir.path().join(pdf).exists());

    let request = Request::builder()
        .uri(format!("/api/download/{markdown}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).starts_with("# Demo Prep: Acme"));

    // a session can only be continued once
    let (status, _) = send(
        &app,
        post_json("/api/continue", json!({"session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::new(), dir.path());

    let request = Request::builder()
        .uri("/api/download/missing.pdf")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_files_stay_in_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let (app, _) = app(CannedSearch::new(), dir.path());
    let domain = format!("www.{}/evil", outside.path().display());

    let (status, body) = send(&app, post_json("/api/research", json!({"domain": domain}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json("/api/continue", json!({"session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let markdown = body["files"]["markdown"].as_str().unwrap();
    let pdf = body["files"]["pdf"].as_str().unwrap();
    for name in [markdown, pdf] {
        assert!(!name.contains('/') && !name.contains('\\'), "{name}");
        assert!(dir.path().join(name).is_file(), "{name}");
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    assert_eq!(std::fs::read_dir(outside.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_abandoned_sessions_are_kept_within_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(CannedSearch::new(), dir.path());

    for _ in 0..3 {
        let (status, _) = send(&app, post_json("/api/research", json!({"domain": "acme.com"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.sessions.len(), 3);
}

#[tokio::test]
async fn test_expired_sessions_are_evicted() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with_ttl(CannedSearch::new(), dir.path(), Duration::ZERO);

    let (_, body) = send(&app, post_json("/api/research", json!({"domain": "acme.com"}))).await;
    let first = body["session_id"].as_str().unwrap().to_string();
    for _ in 0..4 {
        let (status, _) = send(&app, post_json("/api/research", json!({"domain": "acme.com"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    // only the newest session survives each insert
    assert_eq!(state.sessions.len(), 1);
    assert!(!state.sessions.contains_key(&first));

    let last = state.sessions.iter().next().unwrap().key().clone();
    let (status, body) = send(&app, post_json("/api/continue", json!({"session_id": last}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No research session found");
    assert!(state.sessions.is_empty());
}
