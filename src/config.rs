//! Configuration management for the Spotify track gateway.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, and the
//! download engine location.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory, or the working directory
//! 3. Application defaults (where applicable)
//!
//! The only values without defaults are the Spotify client credentials and the
//! redirect URI; they are collected once at startup into a [`Credentials`]
//! struct that is passed to every component needing them.

use dotenv;
use std::{env, path::PathBuf};

/// Default bind address for the HTTP server.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";

/// Default Spotify OAuth authorization endpoint.
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Default Spotify OAuth token exchange endpoint.
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Default name of the download engine binary, resolved via PATH.
pub const DEFAULT_DOWNLOADER_BIN: &str = "spotdl";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `trackgate/.env`. This allows operators to store
/// configuration securely without hardcoding sensitive values. When no file
/// exists there, a `.env` in the working directory is honored instead.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/trackgate/.env`
/// - macOS: `~/Library/Application Support/trackgate/.env`
/// - Windows: `%LOCALAPPDATA%/trackgate/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment is successfully loaded, or an error
/// string if directory creation or file loading fails.
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - An existing `.env` file cannot be read or parsed
///
/// # Example
///
/// ```
/// use trackgate::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackgate/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    } else {
        // No file in the data directory; a working-directory .env is optional.
        dotenv::dotenv().ok();
    }
    Ok(())
}

/// Spotify application credentials, loaded once at startup.
///
/// Collects the three values every OAuth operation needs: the client id and
/// secret obtained when registering the application with Spotify's developer
/// platform, and the redirect URI that must match the one registered there.
/// The struct is built in `main` and shared read-only for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Credentials {
    /// Builds the credential set from the environment.
    ///
    /// Reads `SPOTIFY_API_AUTH_CLIENT_ID`, `SPOTIFY_API_AUTH_CLIENT_SECRET`
    /// and `SPOTIFY_API_REDIRECT_URI`. All three are required; the first
    /// missing variable is reported by name.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the missing variable.
    ///
    /// # Security Note
    ///
    /// The client secret should be kept confidential and never exposed in
    /// logs or version control.
    pub fn from_env() -> Result<Self, String> {
        Ok(Credentials {
            client_id: require("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: require("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: require("SPOTIFY_API_REDIRECT_URI")?,
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} must be set", name))
}

/// Returns the address and port the HTTP server should bind to.
///
/// Retrieves the `SERVER_ADDRESS` environment variable, falling back to
/// [`DEFAULT_SERVER_ADDRESS`] when unset.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:8080"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Spotify OAuth authorization URL.
///
/// Retrieves the `SPOTIFY_API_AUTH_URL` environment variable which contains
/// the base URL for Spotify's OAuth authorization endpoint, falling back to
/// [`DEFAULT_SPOTIFY_AUTH_URL`]. This is where callers are redirected to
/// grant permissions to the application.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_AUTH_URL.to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Retrieves the `SPOTIFY_API_TOKEN_URL` environment variable which contains
/// the URL for exchanging authorization codes for access tokens during the
/// OAuth flow, falling back to [`DEFAULT_SPOTIFY_TOKEN_URL`].
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_TOKEN_URL.to_string())
}

/// Returns the download engine binary to invoke.
///
/// Retrieves the `DOWNLOADER_BIN` environment variable, falling back to
/// [`DEFAULT_DOWNLOADER_BIN`] resolved via PATH. Set this to an absolute
/// path when the engine is not on the server's PATH.
pub fn downloader_bin() -> PathBuf {
    env::var("DOWNLOADER_BIN")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DOWNLOADER_BIN))
}

/// Returns the working directory for transient downloaded audio.
///
/// Retrieves the `DOWNLOAD_WORK_DIR` environment variable, falling back to
/// `trackgate` under the system temporary directory. Every download gets its
/// own scratch directory below this path and is removed after the response
/// is sent, so nothing here is expected to persist.
pub fn download_work_dir() -> PathBuf {
    env::var("DOWNLOAD_WORK_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("trackgate"))
}
