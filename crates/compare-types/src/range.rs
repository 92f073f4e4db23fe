//! Offset ranges into a normalized text stream

use serde::{Deserialize, Serialize};

/// Unit in which `TextRange` positions and lengths are measured.
///
/// Extraction and diffing must agree on the unit; the diff engine rejects
/// input whose unit differs from its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateUnit {
    #[default]
    Utf16CodeUnit,
}

impl CoordinateUnit {
    /// Length of `text` measured in this unit
    pub fn measure(&self, text: &str) -> usize {
        match self {
            CoordinateUnit::Utf16CodeUnit => text.encode_utf16().count(),
        }
    }

    /// Length of a single character measured in this unit
    pub fn measure_char(&self, c: char) -> usize {
        match self {
            CoordinateUnit::Utf16CodeUnit => c.len_utf16(),
        }
    }
}

/// Half-open range `[position, position + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub position: usize,
    pub length: usize,
}

impl TextRange {
    pub fn new(position: usize, length: usize) -> Self {
        Self { position, length }
    }

    /// Build a range from start (inclusive) and end (exclusive) offsets
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            position: start,
            length: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Overlapping part of two ranges, if they share at least one unit
    pub fn intersect(&self, other: &TextRange) -> Option<TextRange> {
        let start = self.position.max(other.position);
        let end = self.end().min(other.end());
        if start < end {
            Some(TextRange::from_bounds(start, end))
        } else {
            None
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.position && offset < self.end()
    }
}
