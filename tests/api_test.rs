//! Router-level tests for the gateway endpoints.
//!
//! These drive the real router through `tower::ServiceExt::oneshot` with a
//! stub configuration; nothing here talks to the network or requires the
//! download engine to be installed.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use trackgate::{
    api,
    config::Credentials,
    downloader::Downloader,
    management::AuthStateStore,
    server::{AppState, router},
};

/// Test helper: app state with stub credentials and a nonexistent engine.
fn test_state() -> AppState {
    AppState {
        credentials: Arc::new(Credentials {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:8080/auth/spotify/callback".to_string(),
        }),
        downloader: Arc::new(Downloader::new(
            "trackgate-test-engine-that-does-not-exist".into(),
            std::env::temp_dir().join("trackgate-api-tests"),
        )),
        auth_states: Arc::new(AuthStateStore::new(Duration::from_secs(600))),
    }
}

/// Test helper: plain GET request
fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Test helper: read a response body to a string
async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

/// Test helper: pull one query parameter out of a URL
fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(&format!("{}=", key)))
        .map(|v| v.to_string())
}

#[tokio::test]
async fn test_health() {
    let app = router(test_state());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_authorize_redirects_to_provider() {
    let app = router(test_state());

    let response = app.oneshot(get("/auth/spotify")).await.unwrap();

    // Temporary redirect pointed at the provider's authorize endpoint
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Should have a location header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("https://accounts.spotify.com/authorize?"));

    // Carries the client id, the redirect URI, and the code response type
    assert_eq!(
        query_param(&location, "client_id").as_deref(),
        Some("test-client-id")
    );
    assert_eq!(
        query_param(&location, "response_type").as_deref(),
        Some("code")
    );
    assert!(query_param(&location, "redirect_uri").is_some());

    // All three read scopes are requested
    let scope = query_param(&location, "scope").unwrap();
    assert!(scope.contains("playlist-read-private"));
    assert!(scope.contains("playlist-read-collaborative"));
    assert!(scope.contains("user-library-read"));

    // The anti-forgery state is 16 alphanumeric characters
    let state = query_param(&location, "state").unwrap();
    assert_eq!(state.len(), 16);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_authorize_states_are_unique() {
    let state = test_state();

    let first = router(state.clone())
        .oneshot(get("/auth/spotify"))
        .await
        .unwrap();
    let second = router(state)
        .oneshot(get("/auth/spotify"))
        .await
        .unwrap();

    let loc1 = first.headers()[header::LOCATION].to_str().unwrap().to_string();
    let loc2 = second.headers()[header::LOCATION].to_str().unwrap().to_string();

    assert_ne!(
        query_param(&loc1, "state"),
        query_param(&loc2, "state"),
        "consecutive authorize calls must carry different states"
    );
}

#[tokio::test]
async fn test_callback_rejects_unknown_state() {
    let app = router(test_state());

    // A state the gateway never issued is turned away before any provider
    // call; no network access happens here.
    let response = app
        .oneshot(get("/auth/spotify/callback?code=abc&state=aaaabbbbccccdddd"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response.into_body()).await;
    assert!(body.contains("unknown or expired"));
}

#[tokio::test]
async fn test_callback_requires_code_and_state() {
    let app = router(test_state());

    let response = app.oneshot(get("/auth/spotify/callback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_requires_token_param() {
    let app = router(test_state());

    let response = app.oneshot(get("/auth/spotify/refresh")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejects_out_of_range_bitrate() {
    let state = test_state();

    // Below the minimum
    let response = router(state.clone())
        .oneshot(get("/download/from-spotify-id?id=abc&bitrate=64"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response.into_body()).await;
    assert!(body.contains("bitrate"));

    // Above the maximum
    let response = router(state)
        .oneshot(get("/download/from-spotify-id?id=abc&bitrate=321"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_failure_returns_stringified_error() {
    let app = router(test_state());

    // The stub engine binary does not exist, so the search step fails; the
    // endpoint answers 500 with the stringified error as its body.
    let response = app
        .oneshot(get("/download/from-spotify-id?id=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response.into_body()).await;
    assert!(!body.is_empty());
}

#[tokio::test]
async fn test_cors_allows_dev_origin() {
    let app = router(test_state());

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let app = router(test_state());

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_audio_response_removes_file_after_transmission() {
    // Lay out a scratch directory the way the engine leaves one behind
    let work_dir = tempfile::tempdir().unwrap();
    let session_dir = work_dir.path().join("a1b2c3d4e5f6g7h8");
    std::fs::create_dir(&session_dir).unwrap();
    let path = session_dir.join("Artist - Title.mp3");
    let payload = b"ID3\x04fake-mp3-bytes".to_vec();
    std::fs::write(&path, &payload).unwrap();

    let response = api::audio_response(&path).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("audio/mpeg")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok()),
        Some(payload.len().to_string().as_str())
    );

    // The body is intact...
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), payload.as_slice());

    // ...and once it has been fully consumed, the file and its scratch
    // directory are gone.
    assert!(!path.exists());
    assert!(!session_dir.exists());
}
