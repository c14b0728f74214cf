//! # API Module
//!
//! This module provides the HTTP endpoints served by the gateway. It is the
//! web interface layer: each handler validates its query parameters, invokes
//! the download engine or the OAuth client, and shapes the result as a file
//! stream, a JSON body, or a redirect.
//!
//! ## Endpoints
//!
//! ### Downloads
//!
//! - [`download`] - Resolves a track id through the download engine and
//!   streams the resulting audio file back, deleting it after transmission.
//!
//! ### Authentication
//!
//! - [`authorize`] - Starts the OAuth authorization-code flow with a redirect
//!   to the provider, carrying a recorded anti-forgery state
//! - [`callback`] - Redeems the state and exchanges the authorization code
//!   for tokens
//! - [`refresh`] - Exchanges a refresh token for a new access token
//!
//! ### Monitoring
//!
//! - [`health`] - Returns application status and version information for
//!   monitoring systems
//!
//! ## Error Mapping
//!
//! Handlers map failures onto the two-tier taxonomy: provider-reported
//! rejections become 400s carrying the provider's message verbatim, caller
//! mistakes (bad bitrate, unknown state) become 400s, and everything else is
//! logged server-side and surfaced as a 500 whose body is the stringified
//! error.
//!
//! ## Related Modules
//!
//! - [`crate::downloader`] - Download engine integration
//! - [`crate::spotify`] - Spotify accounts service client
//! - [`crate::management`] - Anti-forgery state registry

mod auth;
mod download;
mod health;

pub use auth::{authorize, callback, refresh};
pub use download::{audio_response, download};
pub use health::health;
