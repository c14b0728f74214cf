use trackgate::downloader::{DownloadError, Downloader, track_url};

#[test]
fn test_track_url() {
    assert_eq!(
        track_url("0Eyn6CEHfYbXYNNXl9OYUzn"),
        "https://open.spotify.com/track/0Eyn6CEHfYbXYNNXl9OYUzn"
    );
}

#[test]
fn test_download_error_display() {
    // The stringified forms end up verbatim in HTTP 500 bodies
    let err = DownloadError::NoResults("https://open.spotify.com/track/x".to_string());
    assert_eq!(err.to_string(), "no results for https://open.spotify.com/track/x");

    let err = DownloadError::Engine("exit status: 1".to_string());
    assert!(err.to_string().contains("download engine failed"));
}

#[tokio::test]
async fn test_search_with_missing_engine_fails() {
    let work_dir = tempfile::tempdir().unwrap();
    let downloader = Downloader::new(
        "trackgate-test-engine-that-does-not-exist".into(),
        work_dir.path().to_path_buf(),
    );

    let result = downloader
        .search("https://open.spotify.com/track/abc")
        .await;

    // A missing binary surfaces as an io error, not a panic
    assert!(matches!(result, Err(DownloadError::IoError(_))));

    // And leaves no metadata files behind in the work dir
    let leftovers = std::fs::read_dir(work_dir.path()).unwrap().count();
    assert_eq!(leftovers, 0);
}
