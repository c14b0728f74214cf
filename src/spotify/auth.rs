use std::fmt;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
    config::{self, Credentials},
    types::TokenBundle,
};

/// Scopes requested during authorization. Fixed: the gateway only ever asks
/// for read access to the caller's playlists and library.
pub const AUTH_SCOPE: &str =
    "playlist-read-private playlist-read-collaborative user-library-read";

/// Failures of the OAuth client, split into the two tiers the handlers need.
///
/// `Provider` carries a message the accounts service itself reported (an
/// invalid code, a revoked refresh token); callers surface it verbatim with a
/// 400. Everything else is a server-side failure surfaced as a 500.
#[derive(Debug)]
pub enum AuthError {
    /// The provider rejected the request and said why.
    Provider(String),
    /// Network or protocol failure talking to the provider.
    Transport(reqwest::Error),
    /// The provider answered with a payload we cannot use.
    Malformed(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Provider(msg) => write!(f, "{}", msg),
            AuthError::Transport(e) => write!(f, "token endpoint unreachable: {}", e),
            AuthError::Malformed(msg) => write!(f, "unexpected provider response: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(err)
    }
}

/// Builds the authorization URL a caller's user-agent is redirected to.
///
/// Assembles the provider's authorize endpoint with `response_type=code`,
/// the configured client id and redirect URI, the fixed [`AUTH_SCOPE`], and
/// the supplied anti-forgery state. Query parameters are properly encoded.
///
/// # Arguments
///
/// * `credentials` - Application credentials loaded at startup
/// * `state` - Anti-forgery token issued for this authorization attempt
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] if the configured authorize endpoint is
/// not a valid URL.
pub fn build_authorize_url(credentials: &Credentials, state: &str) -> Result<String, AuthError> {
    let url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("response_type", "code"),
            ("client_id", credentials.client_id.as_str()),
            ("scope", AUTH_SCOPE),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::Malformed(format!("invalid authorize URL: {}", e)))?;

    Ok(url.into())
}

/// Exchanges an authorization code for an access token.
///
/// Completes the authorization-code flow: posts the code to the provider's
/// token endpoint, authenticating with HTTP basic auth using the client id
/// and secret. This is the final step after the user granted access and the
/// provider redirected back with a code.
///
/// # Arguments
///
/// * `credentials` - Application credentials loaded at startup
/// * `code` - Authorization code received from the OAuth callback
///
/// # Returns
///
/// A [`TokenBundle`] with access token, refresh token, and expiry in seconds.
///
/// # Errors
///
/// - [`AuthError::Provider`] when the provider rejects the code; the message
///   is the provider's own description
/// - [`AuthError::Transport`] on network failure
/// - [`AuthError::Malformed`] when the token payload misses required fields
///
/// # Security Note
///
/// The authorization code is single-use and expires quickly (typically 10
/// minutes). The exchange should happen immediately after receiving it.
pub async fn exchange_code(
    credentials: &Credentials,
    code: &str,
) -> Result<TokenBundle, AuthError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &credentials.redirect_uri),
        ])
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(AuthError::Provider(provider_message(res).await));
    }

    let json: Value = res.json().await?;

    Ok(TokenBundle {
        access_token: string_field(&json, "access_token")?,
        refresh_token: json["refresh_token"].as_str().map(str::to_string),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
    })
}

/// Refreshes an expired access token using a refresh token.
///
/// Exchanges a refresh token for a new access token. Spotify does not rotate
/// refresh tokens, so the returned bundle deliberately carries none and the
/// caller keeps using the one it has.
///
/// # Arguments
///
/// * `credentials` - Application credentials loaded at startup
/// * `refresh_token` - Refresh token obtained from a previous exchange
///
/// # Errors
///
/// Same split as [`exchange_code`]: provider rejections come back as
/// [`AuthError::Provider`] with the provider's message, everything else as
/// transport or malformed-payload errors.
pub async fn refresh_access_token(
    credentials: &Credentials,
    refresh_token: &str,
) -> Result<TokenBundle, AuthError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(AuthError::Provider(provider_message(res).await));
    }

    let json: Value = res.json().await?;

    Ok(TokenBundle {
        access_token: string_field(&json, "access_token")?,
        refresh_token: None,
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
    })
}

// The provider reports failures as {"error": "...", "error_description": "..."};
// the description is the human-readable half when present.
async fn provider_message(res: reqwest::Response) -> String {
    match res.json::<Value>().await {
        Ok(json) => json["error_description"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .unwrap_or("authorization failed")
            .to_string(),
        Err(_) => "authorization failed".to_string(),
    }
}

fn string_field(json: &Value, field: &str) -> Result<String, AuthError> {
    json[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AuthError::Malformed(format!("missing {}", field)))
}
