use httpmock::prelude::*;
use std::time::Duration;
use tempfile::tempdir;
use ui::{ImageLoader, ImageLoaderError};

#[tokio::test]
async fn test_image_cached() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/images/trip/a.jpg");
            then.status(200).body("img");
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 2);
    let url = server.url("/images/trip/a.jpg");

    loader.load(&url).await.unwrap();
    assert!(dir.path().join("images/images/trip/a.jpg").exists());
    mock.assert_hits_async(1).await;

    // Second call should use cache
    loader.load(&url).await.unwrap();
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_extension_case_retry() {
    let server = MockServer::start_async().await;
    let lower = server
        .mock_async(|when, then| {
            when.method(GET).path("/face_images/trip/a/face_0.jpg");
            then.status(404);
        })
        .await;
    let upper = server
        .mock_async(|when, then| {
            when.method(GET).path("/face_images/trip/a/face_0.JPG");
            then.status(200).body("face");
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 2);
    let url = server.url("/face_images/trip/a/face_0.jpg");

    loader.load(&url).await.unwrap();
    lower.assert_hits_async(1).await;
    upper.assert_hits_async(1).await;
    assert!(!dir.path().join("images/face_images").exists());
}

#[tokio::test]
async fn test_face_crops_bypass_disk_cache() {
    let server = MockServer::start_async().await;
    let crop = server
        .mock_async(|when, then| {
            when.method(GET).path("/face_images/trip/a/face_0.jpg");
            then.status(200).body("FULL-CROP");
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 1);
    let url = server.url("/face_images/trip/a/face_0.jpg");

    // Leftover from an interrupted write or an earlier detection run.
    let stale = loader.cache_path(&url);
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, b"FU").unwrap();

    loader.load(&url).await.unwrap();
    loader.load(&url).await.unwrap();
    crop.assert_hits_async(2).await;
    assert_eq!(std::fs::read(&stale).unwrap(), b"FU");
}

#[tokio::test]
async fn test_cache_write_is_complete() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/images/trip/b.jpg");
            then.status(200).body("complete-image");
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 1);
    let url = server.url("/images/trip/b.jpg");
    let cached = loader.cache_path(&url);

    // An empty file never counts as a cache hit.
    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(&cached, b"").unwrap();

    loader.load(&url).await.unwrap();
    mock.assert_hits_async(1).await;
    assert_eq!(std::fs::read(&cached).unwrap(), b"complete-image");
    let leftovers: Vec<_> = std::fs::read_dir(cached.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_retry_failure_reports_first_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/images/missing.JPG");
            then.status(404);
        })
        .await;
    let retry = server
        .mock_async(|when, then| {
            when.method(GET).path("/images/missing.jpg");
            then.status(500);
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 1);
    let err = loader.load(&server.url("/images/missing.JPG")).await.unwrap_err();
    assert_eq!(err, ImageLoaderError::NotFound);
    retry.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_png_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/images/a.png");
            then.status(404);
        })
        .await;

    let dir = tempdir().unwrap();
    let loader = ImageLoader::new(dir.path().to_path_buf(), &server.base_url(), 1);
    let err = loader.load(&server.url("/images/a.png")).await.unwrap_err();
    assert_eq!(err, ImageLoaderError::NotFound);
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_image_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow.png");
            then.status(200).body("img").delay(Duration::from_millis(200));
        })
        .await;

    let dir = tempdir().unwrap();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let loader = ImageLoader::with_client(dir.path().to_path_buf(), &server.base_url(), client, 1);

    let err = loader.load(&server.url("/slow.png")).await.unwrap_err();
    assert_eq!(err, ImageLoaderError::Timeout);
}

#[tokio::test]
async fn test_network_error() {
    let dir = tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{}", addr);
    let loader = ImageLoader::new(dir.path().to_path_buf(), &base, 1);
    let err = loader.load(&format!("{}/img.png", base)).await.unwrap_err();
    match err {
        ImageLoaderError::Network(_) => (),
        other => panic!("expected network error, got {:?}", other),
    }
}
