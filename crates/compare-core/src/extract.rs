//! Text extraction
//!
//! Turns document lines into a normalized text stream per page plus the
//! TextBlocks that tie stream ranges back to line rectangles.
//!
//! Normalization collapses whitespace runs inside a line to a single space
//! and trims the line. Empty lines are dropped. Lines are joined with `\n`;
//! the separators are part of the stream but belong to no TextBlock. Every
//! range is measured in the extractor's [`CoordinateUnit`].

use crate::document::{DocumentSource, TextLine};
use crate::error::CompareError;
use crate::selector::resolve_page_indexes;
use compare_types::{CoordinateUnit, PageSelector, TextBlock, TextRange};
use tracing::debug;

/// Normalized text of one page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub page_index: u32,
    pub text: String,
    /// Ordered, non-overlapping blocks, one per non-empty line
    pub blocks: Vec<TextBlock>,
}

impl ExtractedPage {
    /// Length of the stream in the extraction unit
    pub fn len(&self, unit: CoordinateUnit) -> usize {
        unit.measure(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extraction result for a document (or a page subset of it)
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub unit: CoordinateUnit,
    pub pages: Vec<ExtractedPage>,
}

impl ExtractedText {
    pub fn page(&self, page_index: u32) -> Option<&ExtractedPage> {
        self.pages.iter().find(|p| p.page_index == page_index)
    }

    pub fn page_indexes(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.page_index).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor {
    unit: CoordinateUnit,
}

impl TextExtractor {
    pub fn new(unit: CoordinateUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> CoordinateUnit {
        self.unit
    }

    /// Extract the selected pages of `source` (all pages when `selectors` is `None`)
    ///
    /// Selectors are checked against the page count before any page is read.
    pub fn extract(
        &self,
        source: &dyn DocumentSource,
        selectors: Option<&[PageSelector]>,
    ) -> Result<ExtractedText, CompareError> {
        let indexes = resolve_page_indexes(selectors, source.page_count())?;
        self.extract_indexes(source, &indexes)
    }

    /// Extract already-resolved page indexes
    pub fn extract_indexes(
        &self,
        source: &dyn DocumentSource,
        indexes: &[u32],
    ) -> Result<ExtractedText, CompareError> {
        let mut pages = Vec::with_capacity(indexes.len());
        for &page_index in indexes {
            let lines = source.page_lines(page_index)?;
            pages.push(self.extract_page(page_index, &lines));
        }
        debug!(pages = pages.len(), "Extracted text");
        Ok(ExtractedText {
            unit: self.unit,
            pages,
        })
    }

    pub fn extract_page(&self, page_index: u32, lines: &[TextLine]) -> ExtractedPage {
        let mut text = String::new();
        let mut blocks = Vec::new();
        let mut offset = 0;

        for line in lines {
            let normalized = normalize_line(&line.text);
            if normalized.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push('\n');
                offset += self.unit.measure_char('\n');
            }
            let length = self.unit.measure(&normalized);
            blocks.push(TextBlock {
                page_index,
                range: TextRange::new(offset, length),
                rect: line.rect,
            });
            text.push_str(&normalized);
            offset += length;
        }

        ExtractedPage {
            page_index,
            text,
            blocks,
        }
    }
}

/// Collapse whitespace runs to one space and trim
pub fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
