//! Document sources
//!
//! The comparison engine never parses or renders documents itself. It reads
//! page lines through [`DocumentSource`], which the PDF loader and the
//! in-memory document implement.

use crate::error::CompareError;
use compare_types::PdfRect;
use sha2::{Digest, Sha256};

/// One visual line of a page with its bounding rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub rect: PdfRect,
}

impl TextLine {
    pub fn new(text: impl Into<String>, rect: PdfRect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }
}

/// Read access to a paginated document
pub trait DocumentSource: Send + Sync {
    fn page_count(&self) -> u32;

    /// Lines of a page in reading order
    fn page_lines(&self, page_index: u32) -> Result<Vec<TextLine>, CompareError>;

    /// Stable content hash, used to cache extraction results
    fn fingerprint(&self) -> String;
}

/// Places plain lines on a page when the source has no glyph positions
///
/// Lines are stacked from the top margin at a fixed line height. Each line is
/// as wide as its text at a fixed advance per UTF-16 code unit, capped at the
/// printable width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub line_height: f64,
    pub char_width: f64,
}

impl Default for LineLayout {
    fn default() -> Self {
        // US Letter at 72 DPI
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 72.0,
            line_height: 14.0,
            char_width: 6.0,
        }
    }
}

impl LineLayout {
    /// Layout for a page of the given size, keeping the default metrics
    pub fn for_page(width: f64, height: f64) -> Self {
        Self {
            page_width: width,
            page_height: height,
            ..Self::default()
        }
    }

    pub fn layout<S: AsRef<str>>(&self, lines: &[S]) -> Vec<TextLine> {
        let max_width = (self.page_width - 2.0 * self.margin).max(0.0);
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let text = line.as_ref();
                let units = text.encode_utf16().count() as f64;
                TextLine::new(
                    text,
                    PdfRect::new(
                        self.margin,
                        self.margin + i as f64 * self.line_height,
                        (units * self.char_width).min(max_width),
                        self.line_height,
                    ),
                )
            })
            .collect()
    }
}

/// A document held as lines in memory
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryDocument {
    pages: Vec<Vec<TextLine>>,
    fingerprint: String,
}

impl InMemoryDocument {
    /// Build from positioned lines
    pub fn with_lines(pages: Vec<Vec<TextLine>>) -> Self {
        let mut hasher = Sha256::new();
        for page in &pages {
            for line in page {
                hasher.update(line.text.as_bytes());
                hasher.update(b"\n");
            }
            hasher.update(b"\x0c");
        }
        Self {
            fingerprint: hex::encode(hasher.finalize()),
            pages,
        }
    }

    /// Build from one string per page, laid out with [`LineLayout::default`]
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let layout = LineLayout::default();
        let pages = pages
            .iter()
            .map(|page| {
                let lines: Vec<&str> = page.as_ref().lines().collect();
                layout.layout(&lines)
            })
            .collect();
        Self::with_lines(pages)
    }

    /// Build from plain text where form feeds separate pages
    pub fn from_text(text: &str) -> Self {
        let pages: Vec<&str> = text.split('\x0c').collect();
        Self::from_pages(&pages)
    }
}

impl DocumentSource for InMemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_lines(&self, page_index: u32) -> Result<Vec<TextLine>, CompareError> {
        self.pages
            .get(page_index as usize)
            .cloned()
            .ok_or(CompareError::PageOutOfRange {
                page_index,
                page_count: self.page_count(),
            })
    }

    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }
}
