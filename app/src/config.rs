use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "FACEGALLERY";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub backend_url: String,
    pub log_level: String,
    pub batch_size: usize,
    pub preload_threads: usize,
    pub request_timeout_secs: u64,
    pub cache_path: PathBuf,
}

#[derive(Debug, Default)]
pub struct AppConfigOverrides {
    pub backend_url: Option<String>,
    pub log_level: Option<String>,
    pub batch_size: Option<usize>,
    pub preload_threads: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".facegallery")
}

pub fn default_path() -> PathBuf {
    base_dir().join("config")
}

impl AppConfig {
    /// Read `path` (or `~/.facegallery/config`) and `FACEGALLERY_*` variables.
    /// Missing or malformed values fall back to defaults.
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(default_path);
        let cfg = config::Config::builder()
            .add_source(
                config::File::new(&path.to_string_lossy(), config::FileFormat::Toml).required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .unwrap_or_else(|e| {
                eprintln!("Ignoring invalid config {}: {}", path.display(), e);
                config::Config::default()
            });

        let backend_url = cfg
            .get_string("backend_url")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let batch_size = cfg
            .get_int("batch_size")
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(50) as usize;
        let preload_threads = cfg
            .get_int("preload_threads")
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(4) as usize;
        let request_timeout_secs = cfg
            .get_int("request_timeout_secs")
            .ok()
            .filter(|n| *n >= 0)
            .unwrap_or(60) as u64;
        let cache_path = cfg
            .get_string("cache_path")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir());

        Self {
            backend_url,
            log_level,
            batch_size,
            preload_threads,
            request_timeout_secs,
            cache_path,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(u) = &ov.backend_url {
            self.backend_url = u.clone();
        }
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(b) = ov.batch_size {
            self.batch_size = b.max(1);
        }
        if let Some(pt) = ov.preload_threads {
            self.preload_threads = pt.max(1);
        }
        if let Some(t) = ov.request_timeout_secs {
            self.request_timeout_secs = t;
        }
        self
    }

    /// `None` when the timeout is disabled (0 seconds).
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = path.unwrap_or_else(default_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let cfg = AppConfig::load_from(Some(dir.path().join("missing")));
        assert_eq!(cfg.backend_url, "http://localhost:8000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.preload_threads, 4);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    #[serial]
    fn file_then_env_then_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(
            &path,
            "backend_url = \"http://files:9000\"\nbatch_size = 10\nrequest_timeout_secs = 0\n",
        )
        .unwrap();

        std::env::set_var("FACEGALLERY_BATCH_SIZE", "20");
        let cfg = AppConfig::load_from(Some(path));
        std::env::remove_var("FACEGALLERY_BATCH_SIZE");

        assert_eq!(cfg.backend_url, "http://files:9000");
        assert_eq!(cfg.batch_size, 20);
        assert_eq!(cfg.request_timeout(), None);

        let cfg = cfg.apply_overrides(&AppConfigOverrides {
            backend_url: Some("http://flag:1".into()),
            batch_size: Some(0),
            ..Default::default()
        });
        assert_eq!(cfg.backend_url, "http://flag:1");
        assert_eq!(cfg.batch_size, 1);
    }

    #[test]
    #[serial]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let mut cfg = AppConfig::load_from(Some(path.clone()));
        cfg.log_level = "debug".into();
        cfg.cache_path = dir.path().join("cache");
        cfg.save_to(Some(path.clone())).unwrap();

        assert_eq!(AppConfig::load_from(Some(path)), cfg);
    }
}
