//! Text comparison of extracted documents
//!
//! Selected pages are paired in order and every pair is diffed on its own.
//! Surplus pages on the longer side are paired with nothing and show up as a
//! full-page insertion or deletion.

use crate::align::AlignmentMapper;
use crate::diff::DiffEngine;
use crate::error::CompareError;
use crate::extract::{ExtractedPage, ExtractedText};
use compare_types::{ComparisonResult, DocumentComparisonResult, PageComparisonResult, TextComparisonOptions};
use tracing::debug;

/// Pair page indexes in selection order
pub fn pair_pages(original: &[u32], changed: &[u32]) -> Vec<(Option<u32>, Option<u32>)> {
    let count = original.len().max(changed.len());
    (0..count)
        .map(|i| (original.get(i).copied(), changed.get(i).copied()))
        .collect()
}

/// Diff one page pair and map its operations onto page rectangles
pub fn compare_page_pair(
    engine: &DiffEngine,
    original: Option<&ExtractedPage>,
    changed: Option<&ExtractedPage>,
) -> PageComparisonResult {
    let original_text = original.map(|p| p.text.as_str()).unwrap_or_default();
    let changed_text = changed.map(|p| p.text.as_str()).unwrap_or_default();

    let mut hunks = engine.diff(original_text, changed_text);
    let original_blocks = original.map(|p| p.blocks.as_slice()).unwrap_or_default();
    let changed_blocks = changed.map(|p| p.blocks.as_slice()).unwrap_or_default();
    AlignmentMapper::new(original_blocks, changed_blocks).map_hunks(&mut hunks);

    PageComparisonResult {
        original_page_index: original.map(|p| p.page_index),
        changed_page_index: changed.map(|p| p.page_index),
        comparison_results: vec![ComparisonResult::Text { hunks }],
    }
}

/// Compare two extraction results page pair by page pair
pub fn compare_extracted(
    original: &ExtractedText,
    changed: &ExtractedText,
    options: &TextComparisonOptions,
) -> Result<DocumentComparisonResult, CompareError> {
    let engine = DiffEngine::from_options(options);
    engine.check_unit(original.unit)?;
    engine.check_unit(changed.unit)?;

    let pairs = pair_pages(&original.page_indexes(), &changed.page_indexes());
    debug!(pairs = pairs.len(), word_level = options.word_level, "Comparing pages");

    let document_comparison_results = pairs
        .into_iter()
        .map(|(o, c)| {
            compare_page_pair(
                &engine,
                o.and_then(|i| original.page(i)),
                c.and_then(|i| changed.page(i)),
            )
        })
        .collect();

    Ok(DocumentComparisonResult {
        document_comparison_results,
    })
}
