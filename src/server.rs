use axum::{Extension, Router, http::HeaderValue, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{
    api, config::Credentials, downloader::Downloader, error, info, management::AuthStateStore,
};

/// Browser origins allowed to call the gateway during development.
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Shared application context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<Credentials>,
    pub downloader: Arc<Downloader>,
    pub auth_states: Arc<AuthStateStore>,
}

pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(origin))
        .collect();

    // Wildcards cannot be combined with credentials; methods and headers
    // mirror the request instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/health", get(api::health))
        .route("/download/from-spotify-id", get(api::download))
        .route("/auth/spotify", get(api::authorize))
        .route("/auth/spotify/callback", get(api::callback))
        .route("/auth/spotify/refresh", get(api::refresh))
        .layer(Extension(state))
        .layer(cors)
}

pub async fn start_api_server(addr: &str, state: AppState) {
    let app = router(state);

    let addr = match SocketAddr::from_str(addr) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };
    info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
