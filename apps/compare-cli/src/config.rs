//! Configuration file for the `compare` binary
//!
//! ```toml
//! [text]
//! word_level = true
//! number_of_context_words = 3
//!
//! [ai]
//! base_url = "https://ai.example.com/v1"
//! timeout_ms = 20000
//!
//! [highlight]
//! insertion_color = "#00AA00"
//! ```
//!
//! Every section is optional. Command-line flags win over file values.

use anyhow::{Context, Result};
use compare_ai::AiConfig;
use compare_session::HighlightStyle;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextSection {
    pub word_level: bool,
    pub number_of_context_words: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub text: TextSection,
    pub ai: Option<AiConfig>,
    pub highlight: HighlightStyle,
}

impl CliConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse config TOML")
    }
}
