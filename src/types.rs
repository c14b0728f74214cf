use std::fmt;

use serde::{Deserialize, Serialize};

/// A track resolved by the download engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    pub url: String,
    #[serde(default)]
    pub song_id: Option<String>,
}

impl Song {
    pub fn display_name(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.artists.join(", "), self.name)
        }
    }
}

/// Tokens returned to the caller after an exchange or refresh.
///
/// `refresh_token` is absent on refresh responses since Spotify does not
/// rotate refresh tokens; the field is skipped entirely in that case so the
/// JSON body carries only `access_token` and `expires_in`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// Target audio encoding bitrate in kbps, constrained to 128..=320.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitrate(u16);

pub const MIN_BITRATE: u16 = 128;
pub const MAX_BITRATE: u16 = 320;

impl Bitrate {
    pub fn new(kbps: u16) -> Result<Self, String> {
        if (MIN_BITRATE..=MAX_BITRATE).contains(&kbps) {
            Ok(Bitrate(kbps))
        } else {
            Err(format!(
                "bitrate must be between {} and {}, got {}",
                MIN_BITRATE, MAX_BITRATE, kbps
            ))
        }
    }

    pub fn kbps(&self) -> u16 {
        self.0
    }
}

impl Default for Bitrate {
    fn default() -> Self {
        Bitrate(MAX_BITRATE)
    }
}

// Rendered the way the download engine expects it, e.g. "320k".
impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}k", self.0)
    }
}
