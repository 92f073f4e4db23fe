//! Comparison request descriptors

use serde::{Deserialize, Serialize};

/// Default number of words shown around a change
pub const DEFAULT_CONTEXT_WORDS: usize = 5;

/// Selects pages by 0-based index: a single page or an inclusive range
///
/// Serializes as `3` or `[2, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSelector {
    Index(u32),
    Range(u32, u32),
}

impl PageSelector {
    /// First and last selected page (inclusive)
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            PageSelector::Index(i) => (i, i),
            PageSelector::Range(start, end) => (start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextComparisonOptions {
    /// Words of unchanged text shown on each side of a change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_context_words: Option<usize>,
    /// Compare whole words instead of single characters
    #[serde(default)]
    pub word_level: bool,
}

impl TextComparisonOptions {
    pub fn word_level() -> Self {
        Self {
            word_level: true,
            ..Self::default()
        }
    }

    pub fn with_context_words(mut self, words: usize) -> Self {
        self.number_of_context_words = Some(words);
        self
    }

    pub fn context_words(&self) -> usize {
        self.number_of_context_words.unwrap_or(DEFAULT_CONTEXT_WORDS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiOperationType {
    /// Natural-language summary plus a category set
    Analyze,
    /// Per-change category tags
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiComparisonOptions {
    pub operation_type: AiOperationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Options for the text diff the AI pass is built on
    #[serde(default)]
    pub text_options: TextComparisonOptions,
}

impl AiComparisonOptions {
    pub fn analyze() -> Self {
        Self {
            operation_type: AiOperationType::Analyze,
            categories: None,
            text_options: TextComparisonOptions::default(),
        }
    }

    pub fn tag(categories: Vec<String>) -> Self {
        Self {
            operation_type: AiOperationType::Tag,
            categories: Some(categories),
            text_options: TextComparisonOptions::default(),
        }
    }
}

/// What a comparison request should produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum ComparisonOperation {
    Text(TextComparisonOptions),
    Ai(AiComparisonOptions),
}

impl ComparisonOperation {
    /// Options of the underlying text diff
    pub fn text_options(&self) -> &TextComparisonOptions {
        match self {
            ComparisonOperation::Text(options) => options,
            ComparisonOperation::Ai(options) => &options.text_options,
        }
    }
}
