//! Drive client configuration.
//!
//! Configuration is plain data handed to [`DriveUploader`](crate::DriveUploader)
//! at construction. It can be built in code, read from the environment, or
//! loaded from a TOML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Environment key holding the default destination folder token.
pub const ENV_DEFAULT_FOLDER: &str = "FEISHU_DRIVE_UPLOAD_FOLDER_TOKEN";

/// Environment key overriding the Open API base URL.
pub const ENV_BASE_URL: &str = "FEISHU_OPEN_API_BASE_URL";

/// Default Open API base URL.
pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn/open-apis";

pub const UPLOAD_ALL_PATH: &str = "/drive/v1/files/upload_all";
pub const UPLOAD_PREPARE_PATH: &str = "/drive/v1/files/upload_prepare";
pub const UPLOAD_PART_PATH: &str = "/drive/v1/files/upload_part";
pub const UPLOAD_FINISH_PATH: &str = "/drive/v1/files/upload_finish";

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Drive client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Open API base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Destination folder used when a call does not name one.
    #[serde(default)]
    pub default_folder: Option<String>,

    /// Per-request timeout handed to the transport, in seconds. Zero means
    /// the default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_folder: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DriveConfig {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            config.base_url = base;
        }
        config.default_folder = lookup(ENV_DEFAULT_FOLDER).filter(|v| !v.is_empty());
        config
    }

    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a TOML file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Sets the default destination folder.
    pub fn with_default_folder(mut self, folder: impl Into<String>) -> Self {
        self.default_folder = Some(folder.into());
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Resolves the destination folder for one upload.
    ///
    /// A non-empty `explicit` folder wins over the configured default.
    /// Empty strings count as unset.
    pub fn resolve_folder(&self, explicit: Option<&str>) -> Result<String, UploadError> {
        explicit
            .filter(|f| !f.is_empty())
            .or(self.default_folder.as_deref().filter(|f| !f.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                UploadError::Configuration(format!(
                    "no destination folder configured: set {ENV_DEFAULT_FOLDER} or pass a parent folder"
                ))
            })
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(default_timeout_secs()),
            secs => Duration::from_secs(secs),
        }
    }

    /// Full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
