//! Runtime configuration.
//!
//! Layers, lowest priority first: built-in defaults, an optional
//! `config/resto-admin.{toml,json,yaml}` file, then `RESTO_ADMIN__*`
//! environment variables (a `.env` file is loaded first when present).
//! Example: `RESTO_ADMIN__API_BASE_URL=https://api.example.com`.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

const ENV_PREFIX: &str = "RESTO_ADMIN";
const CONFIG_FILE: &str = "config/resto-admin";

/// Where the persisted `auth` entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// `local_settings` table in the local SQLite database.
    Sqlite,
    /// OS credential store.
    Keyring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub session_backend: SessionBackend,
    pub log_format: LogFormat,
    pub max_log_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            data_dir: default_data_dir(),
            request_timeout_secs: 30,
            search_debounce_ms: 400,
            session_backend: SessionBackend::Sqlite,
            log_format: LogFormat::Pretty,
            max_log_files: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> AdminResult<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(CONFIG_FILE)
    }

    /// Load with an explicit config file stem (without extension).
    pub fn load_from(file_stem: &str) -> AdminResult<Self> {
        let defaults = AppConfig::default();
        let builder = Config::builder()
            .set_default("api_base_url", defaults.api_base_url.clone())?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("search_debounce_ms", defaults.search_debounce_ms)?
            .set_default("session_backend", "sqlite")?
            .set_default("log_format", "pretty")?
            .set_default("max_log_files", defaults.max_log_files as u64)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.api_base_url = normalize_base_url(&cfg.api_base_url);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AdminResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AdminError::Config("api_base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AdminError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Normalise the API base URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn default_data_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                .join(".local")
                .join("share")
        });
    base.join("resto-admin")
}
