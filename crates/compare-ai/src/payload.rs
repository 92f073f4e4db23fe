//! Payload transformation
//!
//! Every change of a diff is reduced to `{id, type, text, contextBefore,
//! contextAfter, page}`. Ids have the form `"{pair}:{hunk}:{operation}"` and
//! are the only key used to correlate service responses back to changes.

use compare_core::ChangeContext;
use compare_types::{
    AiChangePayload, AiEnhancedChange, DocumentComparisonResult, Operation, OperationType,
    TaggedChange,
};
use std::collections::HashMap;
use tracing::warn;

/// Payloads for every change of `result`, in document order
pub fn change_payloads(result: &DocumentComparisonResult, context_words: usize) -> Vec<AiChangePayload> {
    let mut payloads = Vec::new();

    for (pair, page) in result.document_comparison_results.iter().enumerate() {
        let mut flat: Vec<&Operation> = Vec::new();
        let mut ids: Vec<(usize, usize)> = Vec::new();
        for (hunk_index, hunk) in page.hunks().enumerate() {
            for (op_index, op) in hunk.operations.iter().enumerate() {
                flat.push(op);
                ids.push((hunk_index, op_index));
            }
        }

        for (index, op) in flat.iter().enumerate() {
            if !op.is_change() {
                continue;
            }
            let context = ChangeContext::around(&flat, index, context_words);
            let page_index = match op.op_type {
                OperationType::Insert => page.changed_page_index.or(page.original_page_index),
                _ => page.original_page_index.or(page.changed_page_index),
            };
            let (hunk_index, op_index) = ids[index];
            payloads.push(AiChangePayload {
                id: format!("{}:{}:{}", pair, hunk_index, op_index),
                change_type: op.op_type,
                text: op.text.clone(),
                context_before: context.before,
                context_after: context.after,
                page: page_index,
            });
        }
    }

    payloads
}

pub fn is_whitespace_only(change: &AiChangePayload) -> bool {
    change.text.trim().is_empty()
}

/// Changes worth sending to the service
pub fn transform_changes(changes: &[AiChangePayload]) -> Vec<AiChangePayload> {
    changes
        .iter()
        .filter(|c| !is_whitespace_only(c))
        .cloned()
        .collect()
}

/// Keep tags whose id was sent and join them with their payloads
///
/// Tags for unknown ids are dropped.
pub fn correlate_tags(
    sent: &[AiChangePayload],
    tags: Vec<TaggedChange>,
) -> (Vec<TaggedChange>, Vec<AiEnhancedChange>) {
    let by_id: HashMap<&str, &AiChangePayload> = sent.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut kept = Vec::with_capacity(tags.len());
    let mut enhanced = Vec::with_capacity(tags.len());
    for tag in tags {
        match by_id.get(tag.id.as_str()) {
            Some(change) => {
                enhanced.push(AiEnhancedChange {
                    change: (*change).clone(),
                    categories: tag.categories.clone(),
                    explanation: tag.explanation.clone(),
                });
                kept.push(tag);
            }
            None => warn!(id = %tag.id, "Dropping tag for unknown change"),
        }
    }

    (kept, enhanced)
}
