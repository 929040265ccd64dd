//! API client for the face gallery backend.

pub mod paths;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Folder name mapped to the ordered list of image paths it contains.
pub type FolderCatalog = BTreeMap<String, Vec<String>>;

/// One ranked candidate for a detected face.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchCandidate {
    pub similarity: f64,
    #[serde(default)]
    pub matched_face: Option<String>,
    #[serde(default)]
    pub origin_image: Option<String>,
}

/// Candidates found for one face of the query image.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchGroup {
    #[serde(default)]
    pub face_path: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchCandidate>,
}

impl MatchGroup {
    /// Origin images of this group in rank order, skipping candidates without one.
    pub fn origin_images(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter_map(|m| m.origin_image.clone())
            .collect()
    }
}

/// What a successful search call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Matches(Vec<MatchGroup>),
    /// The backend answered but found nothing, optionally with a warning.
    NoMatches { warning: Option<String> },
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    folders: FolderCatalog,
}

#[derive(Debug, Deserialize)]
struct FacesResponse {
    #[serde(default)]
    faces: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    matches_per_face: Option<Vec<MatchGroup>>,
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ImagePathRequest<'a> {
    image_path: &'a str,
}

#[derive(Debug, Serialize)]
struct FolderRequest<'a> {
    folder: &'a str,
}

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Backend Error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    BackendError { status: u16, message: Option<String> },
    #[error("Decode Error: {0}")]
    DecodeError(String),
    #[error("IO Error: {0}")]
    IoError(String),
}

impl ApiClientError {
    /// Message text supplied by the backend, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiClientError::BackendError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True for failures that never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiClientError::RequestError(_) | ApiClientError::Timeout)
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiClientError::Timeout
        } else if e.is_decode() {
            ApiClientError::DecodeError(e.to_string())
        } else {
            ApiClientError::RequestError(e.to_string())
        }
    }
}

/// Lower bound for detect/embed requests, which process a whole folder
/// before replying.
pub const FOLDER_TASK_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    folder_task_timeout: Option<Duration>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build a client whose requests give up after `timeout`.
    ///
    /// Folder tasks get at least [`FOLDER_TASK_TIMEOUT`] instead.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| ApiClientError::RequestError(e.to_string()))?;
        Ok(Self::with_client(base_url, client)
            .with_folder_task_timeout(timeout.map(|t| t.max(FOLDER_TASK_TIMEOUT))))
    }

    /// Per-request timeout for `detect_folder` and `calculate_embedding`.
    /// `None` falls back to the client's own timeout.
    pub fn with_folder_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.folder_task_timeout = timeout;
        self
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            client,
            base_url,
            folder_task_timeout: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fully qualified URL for a backend-relative path.
    pub fn resolve(&self, path: &str) -> String {
        paths::resolve(&self.base_url, path)
    }

    /// Backend-relative path for a URL produced by [`ApiClient::resolve`].
    pub fn normalize(&self, url: &str) -> String {
        paths::normalize(&self.base_url, url)
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/api/{}", self.base_url, route)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).ok().and_then(|b| {
            b.error.or_else(|| {
                b.detail.map(|d| match d {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
            })
        });
        Err(ApiClientError::BackendError {
            status: status.as_u16(),
            message,
        })
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn list_folders(&self) -> Result<FolderCatalog, ApiClientError> {
        let start = Instant::now();
        let response = self.client.get(self.endpoint("images")).send().await?;
        let catalog = Self::check(response)
            .await?
            .json::<CatalogResponse>()
            .await?
            .folders;
        tracing::info!("catalog_load_time_ms" = %start.elapsed().as_millis(), "folders" = catalog.len());
        Ok(catalog)
    }

    /// Face crops detected in the image at `image_path` (backend-relative).
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn list_faces(&self, image_path: &str) -> Result<Vec<String>, ApiClientError> {
        let response = self
            .client
            .post(self.endpoint("faces"))
            .header(CONTENT_TYPE, "application/json")
            .json(&ImagePathRequest { image_path })
            .send()
            .await?;
        let faces = Self::check(response).await?.json::<FacesResponse>().await?;
        Ok(faces.faces)
    }

    /// Upload a probe image and search for its faces in `folder`.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, bytes)))]
    pub async fn search_by_upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        folder: &str,
    ) -> Result<SearchOutcome, ApiClientError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("folder", folder.to_string());
        self.search("search-face/", form).await
    }

    /// Read a probe image from disk and run [`ApiClient::search_by_upload`].
    pub async fn search_by_upload_path(
        &self,
        path: &Path,
        folder: &str,
    ) -> Result<SearchOutcome, ApiClientError> {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| ApiClientError::IoError("Invalid file name".into()))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiClientError::IoError(e.to_string()))?;
        self.search_by_upload(file_name, bytes, folder).await
    }

    /// Search `folder` using a face crop the backend already knows about.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn search_by_face(
        &self,
        image_path: &str,
        folder: &str,
    ) -> Result<SearchOutcome, ApiClientError> {
        let form = Form::new()
            .text("image_path", image_path.to_string())
            .text("folder", folder.to_string());
        self.search("search-from-existed-face/", form).await
    }

    async fn search(&self, route: &str, form: Form) -> Result<SearchOutcome, ApiClientError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint(route))
            .multipart(form)
            .send()
            .await?;
        let parsed = Self::check(response).await?.json::<SearchResponse>().await?;
        tracing::info!("search_time_ms" = %start.elapsed().as_millis(), "route" = route);
        Ok(match parsed.matches_per_face {
            Some(groups) if !groups.is_empty() => SearchOutcome::Matches(groups),
            _ => SearchOutcome::NoMatches {
                warning: parsed.warning,
            },
        })
    }

    /// Run face detection over every image in `folder`.
    pub async fn detect_folder(&self, folder: &str) -> Result<String, ApiClientError> {
        self.folder_task("detect-folder", folder).await
    }

    /// Compute embeddings for the detected faces in `folder`.
    pub async fn calculate_embedding(&self, folder: &str) -> Result<String, ApiClientError> {
        self.folder_task("calculate-embedding", folder).await
    }

    async fn folder_task(&self, route: &str, folder: &str) -> Result<String, ApiClientError> {
        let start = Instant::now();
        let mut request = self
            .client
            .post(self.endpoint(route))
            .header(CONTENT_TYPE, "application/json")
            .json(&FolderRequest { folder });
        if let Some(t) = self.folder_task_timeout {
            request = request.timeout(t);
        }
        let response = request.send().await?;
        let status = Self::check(response).await?.json::<StatusResponse>().await?;
        tracing::info!("folder_task_time_ms" = %start.elapsed().as_millis(), "route" = route, "folder" = folder);
        Ok(status.result)
    }
}
