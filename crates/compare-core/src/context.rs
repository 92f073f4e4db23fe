//! Context windows around changes
//!
//! A window is a presentation aid. It never changes operation boundaries:
//! it only cuts the neighbouring unchanged text down to a few words.

use compare_types::{Operation, OperationType};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Unchanged text shown before and after a change
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeContext {
    pub before: String,
    pub after: String,
}

impl ChangeContext {
    /// Window of `words` words around `operations[index]`
    ///
    /// `before` comes from the nearest preceding equal operation and `after`
    /// from the nearest following one, skipping the other half of a
    /// delete/insert pair.
    pub fn around(operations: &[&Operation], index: usize, words: usize) -> Self {
        let is_equal = |op: &&&Operation| op.op_type == OperationType::Equal;

        let before = operations[..index.min(operations.len())]
            .iter()
            .rev()
            .find(is_equal)
            .map(|op| trailing_words(&op.text, words))
            .unwrap_or_default();
        let after = operations
            .iter()
            .skip(index + 1)
            .find(is_equal)
            .map(|op| leading_words(&op.text, words))
            .unwrap_or_default();

        Self {
            before: before.to_string(),
            after: after.to_string(),
        }
    }
}

fn is_word(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

/// Suffix of `text` holding its last `n` words
pub fn trailing_words(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let mut count = 0;
    for (start, segment) in text.split_word_bound_indices().rev() {
        if is_word(segment) {
            count += 1;
            if count == n {
                return &text[start..];
            }
        }
    }
    text
}

/// Prefix of `text` holding its first `n` words
pub fn leading_words(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let mut count = 0;
    for (start, segment) in text.split_word_bound_indices() {
        if is_word(segment) {
            count += 1;
            if count == n {
                return &text[..start + segment.len()];
            }
        }
    }
    text
}
