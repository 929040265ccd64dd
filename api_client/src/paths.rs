//! Helpers for turning backend-relative image paths into URLs and back.

/// Join a backend-relative path onto the base URL with exactly one `/`.
pub fn resolve(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Strip the base URL (and the slash after it) from a fully qualified URL.
///
/// Strings that do not start with the base URL are returned without their
/// leading slashes, so `"/images/a.jpg"` and
/// `"http://host/images/a.jpg"` normalise to the same path.
pub fn normalize(base_url: &str, url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let rest = if base.is_empty() {
        url
    } else {
        url.strip_prefix(base).unwrap_or(url)
    };
    rest.trim_start_matches('/').to_string()
}

/// Swap a trailing `.jpg` for `.JPG` and vice versa.
///
/// Returns `None` for any other extension.
pub fn toggle_jpg_case(url: &str) -> Option<String> {
    if let Some(stem) = url.strip_suffix(".jpg") {
        Some(format!("{}.JPG", stem))
    } else {
        url.strip_suffix(".JPG").map(|stem| format!("{}.jpg", stem))
    }
}

/// Render a similarity score in `[0, 1]` as a percentage with two decimals.
pub fn format_similarity(similarity: f64) -> String {
    format!("{:.2}%", similarity * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_with_single_slash() {
        assert_eq!(resolve("http://host:8000", "/images/a.jpg"), "http://host:8000/images/a.jpg");
        assert_eq!(resolve("http://host:8000/", "images/a.jpg"), "http://host:8000/images/a.jpg");
        assert_eq!(resolve("http://host:8000/", "/images/a.jpg"), "http://host:8000/images/a.jpg");
    }

    #[test]
    fn normalize_strips_base_and_slash() {
        assert_eq!(normalize("http://host", "http://host/images/t/a.jpg"), "images/t/a.jpg");
        assert_eq!(normalize("http://host/", "http://host/images/t/a.jpg"), "images/t/a.jpg");
        assert_eq!(normalize("http://host", "/images/t/a.jpg"), "images/t/a.jpg");
        assert_eq!(normalize("", "/images/t/a.jpg"), "images/t/a.jpg");
    }

    #[test]
    fn toggle_only_touches_the_suffix() {
        assert_eq!(toggle_jpg_case("/x.jpg/a.jpg").as_deref(), Some("/x.jpg/a.JPG"));
        assert_eq!(toggle_jpg_case("/a.JPG").as_deref(), Some("/a.jpg"));
        assert_eq!(toggle_jpg_case("/a.png"), None);
    }

    #[test]
    fn similarity_is_a_percentage() {
        assert_eq!(format_similarity(0.8765), "87.65%");
        assert_eq!(format_similarity(1.0), "100.00%");
    }
}
