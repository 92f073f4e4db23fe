//! AI service configuration
//!
//! Loaded from the `[ai]` table of a TOML file or from `COMPARE_AI_*`
//! environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of the AI comparison service
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Session JWT sent as a bearer token
    #[serde(default)]
    pub token: Option<String>,
}

impl AiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: default_timeout_ms(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load from a TOML file holding the fields at top level
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read AI config: {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse AI config TOML")
    }

    /// Load from the environment
    ///
    /// Returns `Ok(None)` when `COMPARE_AI_URL` is not set.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Option<Self>> {
        let Some(base_url) = var("COMPARE_AI_URL") else {
            return Ok(None);
        };
        let timeout_ms = match var("COMPARE_AI_TIMEOUT_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid COMPARE_AI_TIMEOUT_MS: {}", raw))?,
            None => default_timeout_ms(),
        };
        Ok(Some(Self {
            base_url,
            timeout_ms,
            token: var("COMPARE_AI_TOKEN"),
        }))
    }
}
