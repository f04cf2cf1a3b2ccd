use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// The backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the configured backend URL.
pub const API_URL_ENV: &str = "BLOODBANK_API_URL";

/// Directory, relative to the working root, holding the configuration file.
pub const CONFIG_DIR: &str = ".bbreq";

/// Configuration for talking to the blood bank backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the REST backend, without a trailing slash.
    ///
    /// Endpoint paths such as `/requests` are appended to it.
    api_url: String,

    /// How long to wait for a single backend call, in seconds.
    timeout_secs: u64,

    /// How long a notification stays visible, in seconds.
    notice_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            notice_secs: default_notice_secs(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The conventional location of the configuration file under `root`.
    #[must_use]
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join("config.toml")
    }

    /// Resolves the configuration for a working root.
    ///
    /// An explicit path must exist. Otherwise the conventional file under
    /// `root` is used if present, and the defaults if not. Environment
    /// overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be loaded.
    pub fn resolve(root: &Path, explicit: Option<&Path>) -> Result<Self, String> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let path = Self::default_path(root);
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.set_api_url(&url);
        }
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sets the backend base URL, trimming whitespace and any trailing `/`.
    pub fn set_api_url(&mut self, url: &str) {
        self.api_url = normalise_url(url);
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns how long a notification stays visible.
    #[must_use]
    pub const fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }
}

fn normalise_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_notice_secs() -> u64 {
    3
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_api_url")]
        api_url: String,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default = "default_notice_secs")]
        notice_secs: u64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                api_url,
                timeout_secs,
                notice_secs,
            } => Self {
                api_url: normalise_url(&api_url),
                timeout_secs,
                notice_secs,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            api_url: config.api_url,
            timeout_secs: config.timeout_secs,
            notice_secs: config.notice_secs,
        }
    }
}
