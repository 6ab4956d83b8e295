use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docqa_core::SessionConfig;
use docqa_engine::ClientSettings;
use docqa_logging::docqa_info;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "docqa.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Optional overrides read from the RON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub admin_token: Option<String>,
    pub fast_refresh_ms: Option<u64>,
    pub slow_refresh_ms: Option<u64>,
    pub task_poll_ms: Option<u64>,
    pub notice_ttl_ms: Option<i64>,
}

impl AppConfig {
    /// Loads `explicit` if given, otherwise `./docqa.ron` when it exists.
    ///
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILENAME);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        docqa_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// `backend_url` is the CLI/environment value and wins over the file.
    pub fn client_settings(&self, backend_url: Option<String>) -> ClientSettings {
        let defaults = ClientSettings::default();
        ClientSettings {
            base_url: backend_url
                .or_else(|| self.backend_url.clone())
                .unwrap_or(defaults.base_url),
            connect_timeout: self
                .connect_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            request_timeout: self
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            admin_token: self.admin_token.clone().unwrap_or(defaults.admin_token),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            fast_refresh: self
                .fast_refresh_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fast_refresh),
            slow_refresh: self
                .slow_refresh_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.slow_refresh),
            task_poll: self
                .task_poll_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.task_poll),
            default_notice_ttl_ms: self
                .notice_ttl_ms
                .unwrap_or(defaults.default_notice_ttl_ms),
            slow_down_after: defaults.slow_down_after,
        }
    }
}
