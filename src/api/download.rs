use std::{
    io,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    Extension,
    body::Body,
    extract::Query,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::{Res, downloader, server::AppState, success, types::Bitrate, utils, warning};

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub id: String,
    pub bitrate: Option<u16>,
}

/// Downloads a track's audio and streams it back.
///
/// The bitrate is validated before any engine work; out-of-range values are
/// a caller error. Search and download failures are logged with the full
/// error and surfaced as a 500 whose body is the stringified error. The
/// downloaded file is deleted once the response body has been sent.
pub async fn download(
    Query(params): Query<DownloadParams>,
    Extension(state): Extension<AppState>,
) -> Response {
    let bitrate = match params
        .bitrate
        .map_or_else(|| Ok(Bitrate::default()), Bitrate::new)
    {
        Ok(bitrate) => bitrate,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    let track_url = downloader::track_url(&params.id);

    let song = match state.downloader.search(&track_url).await {
        Ok(song) => song,
        Err(e) => {
            warning!("Search for {} failed: {}", track_url, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let path = match state.downloader.download(&song, bitrate).await {
        Ok(path) => path,
        Err(e) => {
            warning!("Download of {} failed: {}", song.display_name(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    success!("Downloaded {} at {}", song.display_name(), bitrate);

    match audio_response(&path).await {
        Ok(response) => response,
        Err(e) => {
            warning!("Failed to serve {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Builds a streamed file response that removes the file after transmission.
///
/// The remove-on-drop guard travels inside the body stream, so the file
/// outlives every chunk sent to the client and is deleted when the stream is
/// dropped, whether the transfer completed or was abandoned. Deletion
/// failures are logged, never surfaced.
pub async fn audio_response(path: &Path) -> Res<Response> {
    let cleanup = RemoveOnSent {
        path: path.to_path_buf(),
    };
    let len = async_fs::metadata(path).await?.len();
    let file = File::open(path).await?;

    let body = Body::from_stream(AudioFileBody {
        stream: ReaderStream::new(file),
        _cleanup: cleanup,
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, utils::content_type_for_path(path))
        .header(header::CONTENT_LENGTH, len)
        .body(body)?;

    Ok(response)
}

// Deletes the scratch file, then its per-request directory, when dropped.
struct RemoveOnSent {
    path: PathBuf,
}

impl Drop for RemoveOnSent {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warning!("Failed to remove {}: {}", self.path.display(), e);
            return;
        }
        if let Some(parent) = self.path.parent() {
            // Only succeeds once the scratch directory is empty.
            let _ = std::fs::remove_dir(parent);
        }
    }
}

struct AudioFileBody {
    stream: ReaderStream<File>,
    _cleanup: RemoveOnSent,
}

impl Stream for AudioFileBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.stream).poll_next(cx)
    }
}
