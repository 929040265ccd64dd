//! Image loading and disk caching for the gallery UI.

use api_client::paths;
use iced::widget::image::Handle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Semaphore;

const VOLATILE_PREFIXES: [&str; 2] = ["face_images", "upload"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageLoaderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("image not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error("io error: {0}")]
    Io(String),
    #[error("semaphore closed")]
    SemaphoreClosed,
}

#[derive(Debug, Clone)]
pub struct ImageLoader {
    cache_dir: PathBuf,
    base_url: String,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(cache_dir: PathBuf, base_url: &str, permits: usize) -> Self {
        Self::with_client(cache_dir, base_url, reqwest::Client::new(), permits)
    }

    pub fn with_client(
        cache_dir: PathBuf,
        base_url: &str,
        client: reqwest::Client,
        permits: usize,
    ) -> Self {
        Self {
            cache_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            semaphore: Arc::new(Semaphore::new(permits.max(1))),
        }
    }

    /// Where the bytes for `url` are cached on disk.
    ///
    /// The layout mirrors the backend path. `.` and `..` segments are dropped.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let relative = paths::normalize(&self.base_url, url);
        let relative = relative.split(['?', '#']).next().unwrap_or_default();
        let mut path = self.cache_dir.join("images");
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                continue;
            }
            path.push(segment);
        }
        path
    }

    /// Fetch `url`, retrying once with the `.jpg`/`.JPG` extension toggled.
    pub async fn load(&self, url: &str) -> Result<Handle, ImageLoaderError> {
        let start = Instant::now();
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ImageLoaderError::SemaphoreClosed)?;

        let cache_path = self.cache_path(url);
        let cacheable = self.is_cacheable(url);
        if cacheable && is_complete(&cache_path).await {
            return Ok(Handle::from_path(&cache_path));
        }

        let bytes = match self.fetch(url).await {
            Ok(bytes) => bytes,
            Err(first) => match paths::toggle_jpg_case(url) {
                Some(alternate) => {
                    tracing::debug!(url, alternate = %alternate, error = %first, "Retrying with toggled extension");
                    self.fetch(&alternate).await.map_err(|_| first)?
                }
                None => return Err(first),
            },
        };

        tracing::info!("image_load_time_ms" = %start.elapsed().as_millis(), "url" = url);
        if !cacheable {
            return Ok(Handle::from_memory(bytes));
        }
        write_atomic(&cache_path, &bytes).await?;
        Ok(Handle::from_path(&cache_path))
    }

    /// Face crops and upload crops are regenerated under the same paths,
    /// so only gallery images are kept on disk.
    pub fn is_cacheable(&self, url: &str) -> bool {
        let relative = paths::normalize(&self.base_url, url);
        let first = relative.split('/').next().unwrap_or_default();
        !VOLATILE_PREFIXES.contains(&first)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoaderError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ImageLoaderError::NotFound);
        }
        if !status.is_success() {
            return Err(ImageLoaderError::Network(format!("HTTP {}", status)));
        }
        let bytes = response.bytes().await.map_err(map_reqwest)?;
        Ok(bytes.to_vec())
    }
}

async fn is_complete(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Write through a `.part` sibling and rename, so a cache file is either
/// absent or complete.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ImageLoaderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ImageLoaderError::Io(e.to_string()))?;
    }
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = match fs::write(&part, bytes).await {
        Ok(()) => fs::rename(&part, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = fs::remove_file(&part).await;
        return Err(ImageLoaderError::Io(e.to_string()));
    }
    Ok(())
}

fn map_reqwest(e: reqwest::Error) -> ImageLoaderError {
    if e.is_timeout() {
        ImageLoaderError::Timeout
    } else {
        ImageLoaderError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ImageLoader;
    use std::path::{Path, PathBuf};

    #[test]
    fn cache_path_mirrors_backend_layout() {
        let loader = ImageLoader::new(PathBuf::from("/cache"), "http://host:8000/", 2);
        assert_eq!(
            loader.cache_path("http://host:8000/images/trip/a.jpg"),
            PathBuf::from("/cache/images/images/trip/a.jpg")
        );
        assert_eq!(
            loader.cache_path("http://host:8000/../../etc/passwd"),
            PathBuf::from("/cache/images/etc/passwd")
        );
        assert_eq!(
            loader.cache_path("http://host:8000/face_images/a/0.jpg?v=2"),
            PathBuf::from("/cache/images/face_images/a/0.jpg")
        );
    }

    #[test]
    fn crops_are_not_cached() {
        let loader = ImageLoader::new(PathBuf::from("/cache"), "http://host:8000", 1);
        assert!(loader.is_cacheable("http://host:8000/images/trip/a.jpg"));
        assert!(!loader.is_cacheable("http://host:8000/face_images/trip/a/face_0.jpg"));
        assert!(!loader.is_cacheable("http://host:8000/upload/temp_face_0.jpg"));
    }
}
