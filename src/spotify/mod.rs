//! # Spotify Accounts Service Client
//!
//! This module implements the gateway's side of the OAuth 2.0
//! authorization-code flow against the Spotify accounts service. It is the
//! only place that talks to `accounts.spotify.com`; everything above it works
//! with [`crate::types::TokenBundle`] values and never sees raw HTTP.
//!
//! ## Flow Implementation
//!
//! 1. **Authorize URL**: [`auth::build_authorize_url`] assembles the redirect
//!    target with the configured client id, redirect URI, the fixed read-only
//!    scope set, and a caller-supplied anti-forgery state
//! 2. **Code Exchange**: [`auth::exchange_code`] posts the returned code to
//!    the token endpoint, authenticating with the client credentials
//! 3. **Refresh**: [`auth::refresh_access_token`] trades a refresh token for
//!    a fresh access token (Spotify does not rotate refresh tokens)
//!
//! ## Error Handling
//!
//! [`auth::AuthError`] separates provider-reported rejections (surfaced to
//! callers verbatim with a 400) from transport and payload failures (surfaced
//! as 500s). Tokens are never persisted here or anywhere else in the process;
//! they belong to the caller.

pub mod auth;
