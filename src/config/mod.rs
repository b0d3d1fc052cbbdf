//! Client configuration (layered: defaults > TOML file > environment).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StanzaError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_OAUTH_PROVIDER: &str = "google";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "STANZA_API_URL";
const ENV_FRONTEND_URL: &str = "STANZA_FRONTEND_URL";
const ENV_OAUTH_PROVIDER: &str = "STANZA_OAUTH_PROVIDER";
const ENV_TIMEOUT_SECS: &str = "STANZA_TIMEOUT_SECS";
const ENV_STORAGE_DIR: &str = "STANZA_STORAGE_DIR";

/// Where the backend lives and how to reach it.
///
/// # Example
/// ```
/// use stanza::config::ClientConfig;
///
/// let config = ClientConfig::default().with_api_base_url("https://api.example.com/");
/// assert_eq!(config.api_base_url, "https://api.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin; request paths are appended to it.
    pub api_base_url: String,
    /// Origin the OAuth flow redirects back to (`/auth/callback`).
    pub frontend_url: String,
    pub oauth_provider: String,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Directory for the persisted session file.
    pub storage_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            oauth_provider: DEFAULT_OAUTH_PROVIDER.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_dir: default_storage_dir(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `STANZA_*` environment variables (`.env` is
    /// loaded first if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Load a TOML file, then apply environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, StanzaError> {
        let path = path.as_ref();
        let base = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str::<ClientConfig>(&raw).map_err(|err| {
                StanzaError::Configuration(format!("Invalid config at {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(StanzaError::Io(err)),
        };
        let _ = dotenvy::dotenv();
        Ok(base.with_env(|key| std::env::var(key).ok()).normalized())
    }

    /// Apply overrides from an environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_FRONTEND_URL) {
            self.frontend_url = url;
        }
        if let Some(provider) = lookup(ENV_OAUTH_PROVIDER) {
            self.oauth_provider = provider;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = PathBuf::from(dir);
        }
        self.normalized()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self.normalized()
    }

    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into();
        self.normalized()
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Save as TOML.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), StanzaError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = toml::to_string_pretty(self)
            .map_err(|err| StanzaError::Configuration(err.to_string()))?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Default config file location (`~/.stanza/config.toml`).
    pub fn default_path() -> PathBuf {
        default_storage_dir().join("config.toml")
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.frontend_url = self.frontend_url.trim().trim_end_matches('/').to_string();
        self
    }
}

fn default_storage_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".stanza"))
        .unwrap_or_else(|| PathBuf::from(".stanza"))
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
