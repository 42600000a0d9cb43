//! Tests for the HTTP routes.

use arena_server::{Coordinator, MatchActor, MatchHandle, MatchPolicy, MemoryMatchStore, server};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn handle() -> MatchHandle {
    let coordinator =
        Coordinator::open(MemoryMatchStore::new(), MatchPolicy::default()).expect("Open failed");
    MatchActor::spawn(coordinator).0
}

async fn get(uri: &str) -> (StatusCode, String) {
    let response = server::router(handle())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_health() {
    assert_eq!(get("/health").await, (StatusCode::OK, "ok".to_string()));
}

#[tokio::test]
async fn test_index_serves_client_page() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Tic-tac-toe arena</title>"));
    assert!(body.contains("/ws"));
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (status, _) = get("/ws").await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
