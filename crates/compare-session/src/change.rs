//! Navigable change list
//!
//! Every change cluster of a hunk (a deletion, an insertion, or a deletion
//! followed by an insertion) becomes one [`TextComparisonChange`].

use crate::annotation::AnnotationId;
use crate::viewer::DocumentSide;
use compare_core::ChangeContext;
use compare_types::{DocumentComparisonResult, Operation, OperationType, PdfRect, TextBlock};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub side: DocumentSide,
    pub page_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperationType {
    Insert,
    Delete,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextComparisonChange {
    /// Highlights in the changed viewer
    pub insertion_annotations: Vec<AnnotationId>,
    /// Highlights in the original viewer
    pub deletion_annotations: Vec<AnnotationId>,
    pub pages: BTreeSet<DocumentPage>,
    pub inserted_text: String,
    pub deleted_text: String,
    pub insertion_count: usize,
    pub deletion_count: usize,
    pub operation_type: ChangeOperationType,
    /// Unchanged words around the change, for previews
    pub context: ChangeContext,
    #[serde(skip)]
    pub insertion_blocks: Vec<TextBlock>,
    #[serde(skip)]
    pub deletion_blocks: Vec<TextBlock>,
    #[serde(skip)]
    pub original_page_index: Option<u32>,
    #[serde(skip)]
    pub changed_page_index: Option<u32>,
}

impl TextComparisonChange {
    /// Where a viewer should scroll to show this change
    ///
    /// The first highlighted rectangle when there is one, otherwise the page
    /// the change belongs to on that side.
    pub fn scroll_target(&self, side: DocumentSide) -> Option<(u32, Option<PdfRect>)> {
        let (blocks, page) = match side {
            DocumentSide::Original => (&self.deletion_blocks, self.original_page_index),
            DocumentSide::Changed => (&self.insertion_blocks, self.changed_page_index),
        };
        match blocks.first() {
            Some(block) => Some((block.page_index, Some(block.rect))),
            None => page.map(|p| (p, None)),
        }
    }
}

/// Changes of a comparison in document order, without annotations yet
pub fn collect_changes(result: &DocumentComparisonResult, context_words: usize) -> Vec<TextComparisonChange> {
    let mut changes = Vec::new();

    for page in &result.document_comparison_results {
        let flat: Vec<&Operation> = page.hunks().flat_map(|h| h.operations.iter()).collect();
        let mut offset = 0;

        for hunk in page.hunks() {
            let first_change = hunk.operations.iter().position(Operation::is_change);
            let deletion = hunk.changes().find(|op| op.op_type == OperationType::Delete);
            let insertion = hunk.changes().find(|op| op.op_type == OperationType::Insert);

            if let Some(position) = first_change {
                let operation_type = match (deletion, insertion) {
                    (Some(_), Some(_)) => ChangeOperationType::Replace,
                    (Some(_), None) => ChangeOperationType::Delete,
                    _ => ChangeOperationType::Insert,
                };

                let mut pages = BTreeSet::new();
                if let Some(op) = deletion {
                    pages.extend(side_pages(DocumentSide::Original, &op.original_text_blocks, page.original_page_index));
                }
                if let Some(op) = insertion {
                    pages.extend(side_pages(DocumentSide::Changed, &op.changed_text_blocks, page.changed_page_index));
                }

                changes.push(TextComparisonChange {
                    insertion_annotations: Vec::new(),
                    deletion_annotations: Vec::new(),
                    pages,
                    inserted_text: insertion.map(|op| op.text.clone()).unwrap_or_default(),
                    deleted_text: deletion.map(|op| op.text.clone()).unwrap_or_default(),
                    insertion_count: insertion.map(Operation::len).unwrap_or(0),
                    deletion_count: deletion.map(Operation::len).unwrap_or(0),
                    operation_type,
                    context: ChangeContext::around(&flat, offset + position, context_words),
                    insertion_blocks: insertion
                        .map(|op| op.changed_text_blocks.clone())
                        .unwrap_or_default(),
                    deletion_blocks: deletion
                        .map(|op| op.original_text_blocks.clone())
                        .unwrap_or_default(),
                    original_page_index: page.original_page_index,
                    changed_page_index: page.changed_page_index,
                });
            }

            offset += hunk.operations.len();
        }
    }

    changes
}

fn side_pages(side: DocumentSide, blocks: &[TextBlock], fallback: Option<u32>) -> Vec<DocumentPage> {
    let mut pages: Vec<DocumentPage> = blocks
        .iter()
        .map(|b| DocumentPage {
            side,
            page_index: b.page_index,
        })
        .collect();
    if pages.is_empty() {
        pages.extend(fallback.map(|page_index| DocumentPage { side, page_index }));
    }
    pages
}
