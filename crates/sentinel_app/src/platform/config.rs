//! RON configuration for the sentinel binary.
//!
//! Looked up at `--config <path>` or `./sentinel.ron`. A missing file means
//! defaults; an unreadable or malformed one is logged and also falls back to
//! defaults. `SENTINEL_API_URL` overrides the service base URL either way.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sentinel_engine::{ApiSettings, TypewriterSettings, DEFAULT_BASE_URL};
use sentinel_logging::{sentinel_info, sentinel_warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "sentinel.ron";
pub const API_URL_ENV: &str = "SENTINEL_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub typewriter: TypewriterConfig,
    /// Also write logs to `./sentinel.log`.
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            typewriter: TypewriterConfig::default(),
            log_to_file: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Per-character delay; negative values clamp to zero.
    pub speed_ms: i64,
    pub start_delay_ms: i64,
    pub jitter_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            speed_ms: 20,
            start_delay_ms: 0,
            jitter_ms: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

impl AppConfig {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api.base_url.clone(),
            request_timeout: Duration::from_millis(self.api.request_timeout_ms),
            ..ApiSettings::default()
        }
    }

    pub fn typewriter_settings(&self) -> TypewriterSettings {
        TypewriterSettings::from_millis(self.typewriter.speed_ms, self.typewriter.start_delay_ms)
            .with_jitter(Duration::from_millis(self.typewriter.jitter_ms))
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}

/// Reads `path`; `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// `explicit` if given, otherwise `./sentinel.ron`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf)
}

/// Effective configuration from a [`read_config`] result: the file (or
/// defaults) plus the environment override.
pub fn resolve_config(
    path: &Path,
    explicit: bool,
    loaded: Result<Option<AppConfig>, ConfigError>,
) -> AppConfig {
    let mut config = match loaded {
        Ok(Some(config)) => {
            sentinel_info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => {
            if explicit {
                sentinel_warn!("Config file {:?} not found; using defaults", path);
            }
            AppConfig::default()
        }
        Err(err) => {
            sentinel_warn!("{}; using defaults", err);
            AppConfig::default()
        }
    };
    apply_api_url_override(&mut config, std::env::var(API_URL_ENV).ok());
    config
}

fn apply_api_url_override(config: &mut AppConfig, value: Option<String>) {
    let Some(url) = value else {
        return;
    };
    let url = url.trim();
    if url.is_empty() {
        return;
    }
    sentinel_info!("{} overrides api base url with {}", API_URL_ENV, url);
    config.api.base_url = url.to_string();
}
