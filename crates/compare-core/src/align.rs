//! Alignment mapper
//!
//! Maps operation ranges back onto page rectangles. An operation is
//! intersected with every TextBlock it overlaps and each intersection becomes
//! one rectangle, cut horizontally out of the block's line rectangle in
//! proportion to the covered share of the block's text.

use compare_types::{Hunk, TextBlock, TextRange};

/// Rectangles covering `range`, one per overlapping block
///
/// `blocks` must be ordered and non-overlapping, as produced by the
/// extractor. Stream offsets that belong to no block (line separators)
/// produce no rectangle.
pub fn blocks_for_range(blocks: &[TextBlock], range: TextRange) -> Vec<TextBlock> {
    if range.is_empty() {
        return Vec::new();
    }

    let first = blocks.partition_point(|b| b.range.end() <= range.position);
    blocks[first..]
        .iter()
        .take_while(|b| b.range.position < range.end())
        .filter_map(|block| {
            let covered = block.range.intersect(&range)?;
            let length = block.range.length as f64;
            let start = (covered.position - block.range.position) as f64 / length;
            let end = (covered.end() - block.range.position) as f64 / length;
            Some(TextBlock {
                page_index: block.page_index,
                range: covered,
                rect: block.rect.slice_horizontal(start, end),
            })
        })
        .collect()
}

/// Fills the text blocks of operations from the blocks of one page pair
pub struct AlignmentMapper<'a> {
    original: &'a [TextBlock],
    changed: &'a [TextBlock],
}

impl<'a> AlignmentMapper<'a> {
    pub fn new(original: &'a [TextBlock], changed: &'a [TextBlock]) -> Self {
        Self { original, changed }
    }

    /// Deletions map onto the original page, insertions onto the changed
    /// page, equal runs onto both.
    pub fn map_hunks(&self, hunks: &mut [Hunk]) {
        for op in hunks.iter_mut().flat_map(|h| h.operations.iter_mut()) {
            if op.op_type.touches_original() {
                op.original_text_blocks = blocks_for_range(self.original, op.original_range);
            }
            if op.op_type.touches_changed() {
                op.changed_text_blocks = blocks_for_range(self.changed, op.changed_range);
            }
        }
    }
}
