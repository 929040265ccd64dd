use api_client::{ApiClient, ApiClientError, MatchGroup, SearchOutcome};
use std::path::{Path, PathBuf};

pub const NO_MATCHES: &str = "No matches found.";
pub const SEARCH_FAILED: &str = "Failed to search face.";
pub const SEARCH_ERROR: &str = "An error occurred while searching for the face.";

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];

/// True when `path` has an image extension the file picker accepts.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A probe file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDraft {
    pub path: PathBuf,
    pub file_name: String,
}

impl UploadDraft {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        if !is_image_file(&path) {
            return None;
        }
        let file_name = path.file_name()?.to_string_lossy().to_string();
        Some(Self { path, file_name })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Upload,
    Face,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    Upload { file: PathBuf, folder: String },
    Face { image_path: String, folder: String },
}

impl SearchRequest {
    pub fn kind(&self) -> SearchKind {
        match self {
            SearchRequest::Upload { .. } => SearchKind::Upload,
            SearchRequest::Face { .. } => SearchKind::Face,
        }
    }
}

/// Notification text for a failed search.
pub fn failure_message(err: &ApiClientError) -> String {
    if let Some(msg) = err.user_message() {
        return msg.to_string();
    }
    match err {
        ApiClientError::BackendError { .. } => SEARCH_FAILED.to_string(),
        _ => SEARCH_ERROR.to_string(),
    }
}

/// Run `request` against the backend, mapping failures to notification text.
pub async fn run(client: ApiClient, request: SearchRequest) -> Result<SearchOutcome, String> {
    let result = match &request {
        SearchRequest::Upload { file, folder } => client.search_by_upload_path(file, folder).await,
        SearchRequest::Face { image_path, folder } => client.search_by_face(image_path, folder).await,
    };
    result.map_err(|e| {
        tracing::error!(error = %e, kind = ?request.kind(), "Face search failed");
        failure_message(&e)
    })
}

/// What the view should do with a finished search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResolution {
    Show(Vec<MatchGroup>),
    Notify(String),
}

pub fn resolve(result: Result<SearchOutcome, String>) -> SearchResolution {
    match result {
        Ok(SearchOutcome::Matches(groups)) if !groups.is_empty() => SearchResolution::Show(groups),
        Ok(SearchOutcome::Matches(_)) => SearchResolution::Notify(NO_MATCHES.to_string()),
        Ok(SearchOutcome::NoMatches { warning }) => {
            SearchResolution::Notify(warning.unwrap_or_else(|| NO_MATCHES.to_string()))
        }
        Err(msg) => SearchResolution::Notify(msg),
    }
}

/// Folder maintenance operations run by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderTask {
    DetectFaces,
    CalculateEmbedding,
}

impl FolderTask {
    pub fn failure_message(&self) -> &'static str {
        match self {
            FolderTask::DetectFaces => "Failed to detect faces.",
            FolderTask::CalculateEmbedding => "Failed to calculate embedding.",
        }
    }

    pub async fn run(self, client: ApiClient, folder: String) -> Result<String, String> {
        let result = match self {
            FolderTask::DetectFaces => client.detect_folder(&folder).await,
            FolderTask::CalculateEmbedding => client.calculate_embedding(&folder).await,
        };
        result.map_err(|e| {
            tracing::error!(error = %e, task = ?self, folder = %folder, "Folder task failed");
            e.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::MatchCandidate;

    fn group() -> MatchGroup {
        MatchGroup {
            face_path: None,
            matches: vec![MatchCandidate {
                similarity: 0.5,
                matched_face: None,
                origin_image: Some("images/a.jpg".into()),
            }],
        }
    }

    #[test]
    fn resolve_branches() {
        assert_eq!(
            resolve(Ok(SearchOutcome::Matches(vec![group()]))),
            SearchResolution::Show(vec![group()])
        );
        assert_eq!(
            resolve(Ok(SearchOutcome::Matches(Vec::new()))),
            SearchResolution::Notify(NO_MATCHES.into())
        );
        assert_eq!(
            resolve(Ok(SearchOutcome::NoMatches { warning: None })),
            SearchResolution::Notify(NO_MATCHES.into())
        );
        assert_eq!(
            resolve(Ok(SearchOutcome::NoMatches { warning: Some("No face".into()) })),
            SearchResolution::Notify("No face".into())
        );
        assert_eq!(resolve(Err("boom".into())), SearchResolution::Notify("boom".into()));
    }

    #[test]
    fn failure_messages() {
        let with_msg = ApiClientError::BackendError { status: 400, message: Some("bad".into()) };
        assert_eq!(failure_message(&with_msg), "bad");
        let without = ApiClientError::BackendError { status: 500, message: None };
        assert_eq!(failure_message(&without), SEARCH_FAILED);
        assert_eq!(failure_message(&ApiClientError::Timeout), SEARCH_ERROR);
    }

    #[test]
    fn drafts_accept_images_only() {
        let draft = UploadDraft::from_path(PathBuf::from("/tmp/me.JPG")).unwrap();
        assert_eq!(draft.file_name, "me.JPG");
        assert!(UploadDraft::from_path(PathBuf::from("/tmp/notes.txt")).is_none());
        assert!(UploadDraft::from_path(PathBuf::from("/tmp/noext")).is_none());
    }
}
