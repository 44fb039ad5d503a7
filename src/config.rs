// src/config.rs
//! Environment-driven configuration: backend URL, request timeout and the
//! local state directory. An optional `config.yaml` in the working
//! directory supplies defaults; environment variables win over it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5001";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_STATE_DIR: &str = ".cvpreview";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the generation backend, no trailing slash.
    pub backend_url: String,
    /// One fixed client-side timeout for all calls.
    pub timeout_ms: u64,
    /// Where the document cache keeps its files.
    pub state_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    backend_url: Option<String>,
    timeout_ms: Option<u64>,
    state_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from `config.yaml` (when present) and the
    /// `BACKEND_URL`, `API_TIMEOUT_MS` and `CVPREVIEW_STATE_DIR`
    /// environment variables.
    pub fn load() -> Result<Self> {
        let file = Self::read_config_file()?;
        let config = Self::resolve(file, |name| std::env::var(name).ok());
        info!(
            "Configuration: backend={}, timeout={}ms, state_dir={}",
            config.backend_url,
            config.timeout_ms,
            config.state_dir.display()
        );
        Ok(config)
    }

    fn read_config_file() -> Result<Option<ConfigFile>> {
        let path = PathBuf::from("config.yaml");
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).context("Failed to read config.yaml")?;
        let parsed = serde_yaml::from_str(&content).context("Failed to parse config.yaml")?;
        Ok(Some(parsed))
    }

    fn resolve(file: Option<ConfigFile>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();

        let backend_url = env("BACKEND_URL")
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_ms = env("API_TIMEOUT_MS")
            .and_then(|raw| match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unparseable API_TIMEOUT_MS: {}", raw);
                    None
                }
            })
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let state_dir = env("CVPREVIEW_STATE_DIR")
            .map(PathBuf::from)
            .or(file.state_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        Self {
            backend_url,
            timeout_ms,
            state_dir,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
