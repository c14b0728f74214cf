use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    server::AppState,
    spotify::auth::{self as oauth, AuthError},
    warning,
};

/// Starts the authorization-code flow.
///
/// Issues a fresh anti-forgery state, records it for the callback to redeem,
/// and answers with a temporary redirect to the provider's authorize page.
pub async fn authorize(Extension(state): Extension<AppState>) -> Response {
    let anti_forgery = state.auth_states.issue().await;

    match oauth::build_authorize_url(&state.credentials, &anti_forgery) {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            warning!("Failed to build authorize URL: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Completes the authorization-code flow.
///
/// The presented state must match one this process issued and not yet
/// redeemed; otherwise the code is never sent to the provider. Provider
/// rejections come back as a 400 carrying the provider's message.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<AppState>,
) -> Response {
    if !state.auth_states.consume(&params.state).await {
        return (
            StatusCode::BAD_REQUEST,
            "unknown or expired authorization state",
        )
            .into_response();
    }

    match oauth::exchange_code(&state.credentials, &params.code).await {
        Ok(tokens) => Json(tokens).into_response(),
        Err(AuthError::Provider(msg)) => (StatusCode::BAD_REQUEST, msg).into_response(),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub refresh_token: String,
}

/// Trades a refresh token for a fresh access token.
pub async fn refresh(
    Query(params): Query<RefreshParams>,
    Extension(state): Extension<AppState>,
) -> Response {
    match oauth::refresh_access_token(&state.credentials, &params.refresh_token).await {
        Ok(tokens) => Json(tokens).into_response(),
        Err(AuthError::Provider(msg)) => (StatusCode::BAD_REQUEST, msg).into_response(),
        Err(e) => {
            warning!("Token refresh failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
