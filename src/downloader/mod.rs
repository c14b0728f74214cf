//! Handle for the external audio download engine.
//!
//! Track resolution and audio acquisition are owned entirely by the `spotdl`
//! command-line tool; this module supervises it as a subprocess. One
//! [`Downloader`] is created at startup and shared across requests. Every
//! download runs in its own scratch directory under the working directory,
//! and the target bitrate is an explicit per-call argument, so concurrent
//! requests never observe each other's settings.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tokio::{process::Command, sync::Semaphore};

use crate::{
    types::{Bitrate, Song},
    utils, warning,
};

/// Upper bound on engine subprocesses running at once.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 4;

#[derive(Debug)]
pub enum DownloadError {
    /// The engine resolved no song for the given track URL.
    NoResults(String),
    /// The engine exited unsuccessfully or produced no file.
    Engine(String),
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::NoResults(url) => write!(f, "no results for {}", url),
            DownloadError::Engine(msg) => write!(f, "download engine failed: {}", msg),
            DownloadError::IoError(e) => write!(f, "io error: {}", e),
            DownloadError::SerdeError(e) => write!(f, "invalid engine metadata: {}", e),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::IoError(err)
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(err: serde_json::Error) -> Self {
        DownloadError::SerdeError(err)
    }
}

/// Builds the canonical track URL the engine resolves.
pub fn track_url(track_id: &str) -> String {
    format!("https://open.spotify.com/track/{}", track_id)
}

/// Long-lived handle for the download engine binary.
pub struct Downloader {
    binary: PathBuf,
    work_dir: PathBuf,
    permits: Semaphore,
}

impl Downloader {
    pub fn new(binary: PathBuf, work_dir: PathBuf) -> Self {
        Downloader {
            binary,
            work_dir,
            permits: Semaphore::new(MAX_CONCURRENT_DOWNLOADS),
        }
    }

    /// Resolves a track URL to a song record via the engine's metadata mode.
    ///
    /// Runs `spotdl save <url> --save-file <file>` and parses the song list
    /// it writes. The metadata file is transient and removed afterwards.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Engine`] when the engine exits unsuccessfully
    /// - [`DownloadError::NoResults`] when the engine resolves nothing
    /// - [`DownloadError::SerdeError`] when the metadata cannot be parsed
    pub async fn search(&self, track_url: &str) -> Result<Song, DownloadError> {
        async_fs::create_dir_all(&self.work_dir).await?;
        let save_file = self
            .work_dir
            .join(format!("query-{}.spotdl", utils::generate_id(12)));

        let output = Command::new(&self.binary)
            .arg("save")
            .arg(track_url)
            .arg("--save-file")
            .arg(&save_file)
            .output()
            .await?;

        if !output.status.success() {
            if save_file.is_file() {
                remove_file_logged(&save_file).await;
            }
            return Err(DownloadError::Engine(engine_output(&output)));
        }

        let raw = async_fs::read_to_string(&save_file).await?;
        remove_file_logged(&save_file).await;

        let songs: Vec<Song> = serde_json::from_str(&raw)?;
        songs
            .into_iter()
            .next()
            .ok_or_else(|| DownloadError::NoResults(track_url.to_string()))
    }

    /// Materializes the song as an audio file and returns its path.
    ///
    /// Runs `spotdl download <url> --bitrate {n}k` into a scratch directory
    /// unique to this call. The caller owns the returned file and is expected
    /// to delete it (and its directory) once the response has been sent.
    ///
    /// A process-wide semaphore bounds how many engine subprocesses run at
    /// once; callers beyond the bound wait their turn.
    pub async fn download(&self, song: &Song, bitrate: Bitrate) -> Result<PathBuf, DownloadError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DownloadError::Engine("download slots closed".to_string()))?;

        let session_dir = self.work_dir.join(utils::generate_id(16));
        async_fs::create_dir_all(&session_dir).await?;

        let output = Command::new(&self.binary)
            .arg("download")
            .arg(&song.url)
            .arg("--bitrate")
            .arg(bitrate.to_string())
            .arg("--output")
            .arg(session_dir.join("{artists} - {title}.{output-ext}"))
            .output()
            .await?;

        if !output.status.success() {
            remove_dir_logged(&session_dir).await;
            return Err(DownloadError::Engine(engine_output(&output)));
        }

        match Self::find_audio_file(&session_dir).await? {
            Some(path) => Ok(path),
            None => {
                remove_dir_logged(&session_dir).await;
                Err(DownloadError::Engine(
                    "engine reported success but produced no file".to_string(),
                ))
            }
        }
    }

    // The engine controls the final file name and extension, so take the
    // first regular file in the scratch directory.
    async fn find_audio_file(dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

fn engine_output(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    // spotdl reports most failures on stdout
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        format!("engine exited with {}", output.status)
    } else {
        stdout.to_string()
    }
}

async fn remove_file_logged(path: &Path) {
    if let Err(e) = async_fs::remove_file(path).await {
        warning!("Failed to remove {}: {}", path.display(), e);
    }
}

async fn remove_dir_logged(path: &Path) {
    if let Err(e) = async_fs::remove_dir_all(path).await {
        warning!("Failed to remove {}: {}", path.display(), e);
    }
}
