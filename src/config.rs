//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! the `TRAINER_API_URL` environment variable, then command-line flags
//! (applied by the caller).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, TrainerError};

pub const DEFAULT_API_URL: &str = "https://consulting-trainer-api.rashdanhamzah03.workers.dev";
pub const API_URL_ENV: &str = "TRAINER_API_URL";
const APP_DIR: &str = ".consulting-trainer";

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Base URL of the scoring API; `/generate` and the evaluate path are appended.
    pub api_url: String,
    /// Path of the evaluation endpoint. Older deployments used `/api/evaluate`.
    pub evaluate_path: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// How long a toast stays visible.
    pub toast_secs: u64,
    /// Key-value file holding persisted history.
    pub storage_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            api_url: DEFAULT_API_URL.to_string(),
            evaluate_path: "/evaluate".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 60,
            toast_secs: 3,
            storage_path: app_dir().join("storage.json"),
        }
    }
}

/// Shape of the TOML file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    evaluate_path: Option<String>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    toast_secs: Option<u64>,
    storage_path: Option<PathBuf>,
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn app_dir() -> PathBuf {
    home_dir().join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    app_dir().join("config.toml")
}

impl TrainerConfig {
    /// Load from `path` (or the default location). A missing default file is
    /// not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = TrainerConfig::default();
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            config.apply_toml(&text).map_err(|e| {
                TrainerError::Config(format!("{}: {e}", path.display()))
            })?;
            debug!(path = %path.display(), "config file loaded");
        } else if explicit {
            return Err(TrainerError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_env_api_url(&url);
        }
        Ok(config)
    }

    pub fn apply_toml(&mut self, text: &str) -> std::result::Result<(), toml::de::Error> {
        let file: ConfigFile = toml::from_str(text)?;
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.evaluate_path {
            self.evaluate_path = v;
        }
        if let Some(v) = file.connect_timeout_secs {
            self.connect_timeout_secs = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.toast_secs {
            self.toast_secs = v;
        }
        if let Some(v) = file.storage_path {
            self.storage_path = v;
        }
        Ok(())
    }

    fn apply_env_api_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api_url = url.to_string();
        }
    }
}
