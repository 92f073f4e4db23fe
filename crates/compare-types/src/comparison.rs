//! Diff result structures
//!
//! A comparison of two documents is a list of page pairs. Each pair holds
//! text comparison results made of hunks, and each hunk holds the operations
//! (insert, delete, equal) that transform the original page text into the
//! changed page text.

use crate::geometry::PdfRect;
use crate::range::TextRange;
use serde::{Deserialize, Serialize};

/// A page rectangle paired with the text range it visually represents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub page_index: u32,
    pub range: TextRange,
    pub rect: PdfRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Insert,
    Delete,
    Equal,
}

impl OperationType {
    /// The roles of insert and delete swap when the comparison direction flips
    pub fn inverted(self) -> Self {
        match self {
            OperationType::Insert => OperationType::Delete,
            OperationType::Delete => OperationType::Insert,
            OperationType::Equal => OperationType::Equal,
        }
    }

    /// Whether the operation consumes original text
    pub fn touches_original(self) -> bool {
        matches!(self, OperationType::Delete | OperationType::Equal)
    }

    /// Whether the operation consumes changed text
    pub fn touches_changed(self) -> bool {
        matches!(self, OperationType::Insert | OperationType::Equal)
    }
}

/// A single edit unit
///
/// `original_range` is empty (zero length, anchored at the insertion point)
/// for insertions, `changed_range` is empty for deletions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub text: String,
    pub original_range: TextRange,
    pub changed_range: TextRange,
    #[serde(default)]
    pub original_text_blocks: Vec<TextBlock>,
    #[serde(default)]
    pub changed_text_blocks: Vec<TextBlock>,
}

impl Operation {
    pub fn is_change(&self) -> bool {
        self.op_type != OperationType::Equal
    }

    /// Length of the operation's text in the stream unit
    pub fn len(&self) -> usize {
        match self.op_type {
            OperationType::Insert => self.changed_range.length,
            OperationType::Delete | OperationType::Equal => self.original_range.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contiguous alignment block between the two text streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub original_range: TextRange,
    pub changed_range: TextRange,
    pub operations: Vec<Operation>,
}

impl Hunk {
    pub fn has_changes(&self) -> bool {
        self.operations.iter().any(Operation::is_change)
    }

    pub fn changes(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.is_change())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComparisonResult {
    Text { hunks: Vec<Hunk> },
}

impl ComparisonResult {
    pub fn hunks(&self) -> &[Hunk] {
        match self {
            ComparisonResult::Text { hunks } => hunks,
        }
    }

    pub fn hunks_mut(&mut self) -> &mut Vec<Hunk> {
        match self {
            ComparisonResult::Text { hunks } => hunks,
        }
    }
}

/// Comparison of one page pair
///
/// Either index is absent when the page exists on one side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageComparisonResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_page_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_page_index: Option<u32>,
    pub comparison_results: Vec<ComparisonResult>,
}

impl PageComparisonResult {
    pub fn hunks(&self) -> impl Iterator<Item = &Hunk> {
        self.comparison_results.iter().flat_map(|r| r.hunks().iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentComparisonResult {
    pub document_comparison_results: Vec<PageComparisonResult>,
}

impl DocumentComparisonResult {
    /// Every hunk in page-pair order, with the index of its page pair
    pub fn hunks(&self) -> impl Iterator<Item = (usize, &Hunk)> {
        self.document_comparison_results
            .iter()
            .enumerate()
            .flat_map(|(pair, page)| page.hunks().map(move |hunk| (pair, hunk)))
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.hunks().flat_map(|(_, hunk)| hunk.operations.iter())
    }

    pub fn has_changes(&self) -> bool {
        self.operations().any(Operation::is_change)
    }

    /// Total inserted length across all pages, in the stream unit
    pub fn insertion_count(&self) -> usize {
        self.operations()
            .filter(|op| op.op_type == OperationType::Insert)
            .map(Operation::len)
            .sum()
    }

    /// Total deleted length across all pages, in the stream unit
    pub fn deletion_count(&self) -> usize {
        self.operations()
            .filter(|op| op.op_type == OperationType::Delete)
            .map(Operation::len)
            .sum()
    }

    /// `(original_page_index, changed_page_index)` for every page pair
    pub fn page_pairs(&self) -> Vec<(Option<u32>, Option<u32>)> {
        self.document_comparison_results
            .iter()
            .map(|p| (p.original_page_index, p.changed_page_index))
            .collect()
    }
}
