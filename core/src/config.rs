//! Service configuration.
//!
//! RULE: configuration is installed once at startup and is read-only
//! afterwards. Nothing in the desk hardcodes the service address.

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "FRAUD_DESK_API_URL";
pub const ENV_TIMEOUT_MS: &str = "FRAUD_DESK_TIMEOUT_MS";

// Narrative generation can take a while on the service side.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ANALYZE_PATH: &str = "/api/transactions/analyze";
pub const DEFAULT_SUMMARIZE_PATH: &str = "/api/cases/summary";
pub const HEALTH_PATH: &str = "/health";

static INSTALLED: OnceLock<DeskConfig> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeskConfig {
    pub base_url:       String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms:     u64,
    #[serde(default = "default_analyze_path")]
    pub analyze_path:   String,
    #[serde(default = "default_summarize_path")]
    pub summarize_path: String,
}

fn default_timeout_ms() -> u64 { DEFAULT_TIMEOUT_MS }
fn default_analyze_path() -> String { DEFAULT_ANALYZE_PATH.to_string() }
fn default_summarize_path() -> String { DEFAULT_SUMMARIZE_PATH.to_string() }

impl DeskConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url:       base_url.into(),
            timeout_ms:     DEFAULT_TIMEOUT_MS,
            analyze_path:   default_analyze_path(),
            summarize_path: default_summarize_path(),
        }
    }

    /// Read from `FRAUD_DESK_API_URL` (required) and `FRAUD_DESK_TIMEOUT_MS`.
    pub fn from_env() -> DeskResult<Self> {
        let base_url = std::env::var(ENV_BASE_URL)
            .map_err(|_| DeskError::Config(format!("{ENV_BASE_URL} not set")))?;
        let mut config = Self::new(base_url);
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw.trim().parse().map_err(|e| {
                DeskError::Config(format!("{ENV_TIMEOUT_MS}={raw} is not a number: {e}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config pointing at a local service, for tests.
    pub fn default_test() -> Self {
        Self {
            timeout_ms: 2_000,
            ..Self::new("http://127.0.0.1:8000")
        }
    }

    pub fn validate(&self) -> DeskResult<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(DeskError::Config("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DeskError::Config(format!(
                "base_url must start with http:// or https://, got {url}"
            )));
        }
        if self.timeout_ms == 0 {
            return Err(DeskError::Config("timeout_ms must be positive".into()));
        }
        for path in [&self.analyze_path, &self.summarize_path] {
            if !path.starts_with('/') {
                return Err(DeskError::Config(format!("endpoint path must start with '/': {path}")));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), path)
    }

    pub fn analyze_url(&self) -> String { self.endpoint(&self.analyze_path) }
    pub fn summarize_url(&self) -> String { self.endpoint(&self.summarize_path) }
    pub fn health_url(&self) -> String { self.endpoint(HEALTH_PATH) }
}

/// Install the process-wide config. Fails if one is already installed.
pub fn install(config: DeskConfig) -> DeskResult<&'static DeskConfig> {
    config.validate()?;
    INSTALLED
        .set(config)
        .map_err(|_| DeskError::Config("configuration already installed".into()))?;
    installed()
}

pub fn installed() -> DeskResult<&'static DeskConfig> {
    INSTALLED
        .get()
        .ok_or_else(|| DeskError::Config("configuration not installed".into()))
}
