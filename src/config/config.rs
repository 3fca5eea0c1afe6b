//! # Configuration
//!
//! The only externally supplied setting the client strictly needs is the base
//! URL of the staging backend. Local paths (profile storage, export output)
//! and the analysis toggle ride along.
//!
//! ## Resolution order
//!
//! Each field is resolved independently, highest priority first:
//!
//! 1. command-line flag
//! 2. environment variable (`STAGER_BACKEND_URL`, `STAGER_DATA_DIR`,
//!    `STAGER_OUTPUT_DIR`)
//! 3. TOML file (`<config_dir>/virtual-stager/config.toml`)
//! 4. compiled default
//!
//! ## Configuration Parameters
//!
//! | Parameter         | Default                              |
//! |-------------------|--------------------------------------|
//! | `backend_url`     | `http://localhost:8000`              |
//! | `data_dir`        | `<data_local_dir>/virtual-stager`    |
//! | `output_dir`      | `.`                                  |
//! | `enable_analysis` | `true`                               |
//!
//! ## Examples
//!
//! ```rust
//! use virtual_stager::config::{ConfigOverrides, FileConfig, StagerConfig};
//!
//! let overrides = ConfigOverrides {
//!     backend_url: Some("https://stage.example.com/".to_string()),
//!     ..Default::default()
//! };
//! let config = StagerConfig::resolve_with(overrides, |_| None, FileConfig::default()).unwrap();
//! assert_eq!(config.backend_url, "https://stage.example.com");
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{StagingError, StagingResult};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const ENV_BACKEND_URL: &str = "STAGER_BACKEND_URL";
pub const ENV_DATA_DIR: &str = "STAGER_DATA_DIR";
pub const ENV_OUTPUT_DIR: &str = "STAGER_OUTPUT_DIR";
const APP_DIR: &str = "virtual-stager";

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StagerConfig {
    /// Base URL of the staging backend, without a trailing slash.
    pub backend_url: String,
    /// Directory holding persisted house profiles.
    pub data_dir: PathBuf,
    /// Directory exports are written to.
    pub output_dir: PathBuf,
    /// Whether to ask the backend for a scene analysis.
    pub enable_analysis: bool,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub enable_analysis: Option<bool>,
}

/// Contents of the optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub enable_analysis: Option<bool>,
}

impl FileConfig {
    /// Parse a TOML file. A missing file is an empty config.
    pub fn load(path: &Path) -> StagingResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(StagingError::io("read config file", e)
                    .with_path(path.display().to_string()));
            }
        };
        toml::from_str(&raw).map_err(|e| {
            StagingError::config(path.display().to_string(), "<file>", e.to_string())
        })
    }

    /// `<config_dir>/virtual-stager/config.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            data_dir: default_data_dir(),
            output_dir: PathBuf::from("."),
            enable_analysis: true,
        }
    }
}

impl StagerConfig {
    /// Resolve from overrides, the process environment and the default TOML file.
    pub fn resolve(overrides: ConfigOverrides, config_file: Option<&Path>) -> StagingResult<Self> {
        let file = match config_file.map(Path::to_path_buf).or_else(FileConfig::default_path) {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), file)
    }

    /// Resolve with an explicit environment lookup and file contents.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> StagingResult<Self> {
        let defaults = Self::default();
        let env_path = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let config = Self {
            backend_url: overrides
                .backend_url
                .or_else(|| env(ENV_BACKEND_URL).filter(|v| !v.is_empty()))
                .or(file.backend_url)
                .unwrap_or(defaults.backend_url),
            data_dir: overrides
                .data_dir
                .or_else(|| env_path(ENV_DATA_DIR))
                .or(file.data_dir)
                .unwrap_or(defaults.data_dir),
            output_dir: overrides
                .output_dir
                .or_else(|| env_path(ENV_OUTPUT_DIR))
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            enable_analysis: overrides
                .enable_analysis
                .or(file.enable_analysis)
                .unwrap_or(defaults.enable_analysis),
        };
        config.validate()
    }

    /// Check the backend URL and normalise it (no trailing slash).
    pub fn validate(mut self) -> StagingResult<Self> {
        let url = self.backend_url.trim().trim_end_matches('/').to_string();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        let has_host = url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
        if !has_scheme || !has_host {
            return Err(StagingError::config(
                "backend_url",
                self.backend_url,
                "must be an http:// or https:// URL with a host",
            )
            .with_recovery_suggestion(format!(
                "Pass --backend-url or set {}",
                ENV_BACKEND_URL
            )));
        }
        self.backend_url = url;
        Ok(self)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./stager_data"))
}
