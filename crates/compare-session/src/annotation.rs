//! Highlight annotations
//!
//! Diff highlights are marked with [`AnnotationOrigin::DiffVisualization`]
//! in the data itself. Such annotations are never persistable, whichever
//! code path ends up holding them.

use compare_types::PdfRect;
use serde::{Deserialize, Serialize};

/// Handle of an annotation inside one viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationOrigin {
    /// Created by a comparison session to show a change
    DiffVisualization,
    /// Authored by a user, part of the document content
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Insertion,
    Deletion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightAnnotation {
    pub page_index: u32,
    pub rect: PdfRect,
    pub kind: HighlightKind,
    /// CSS hex color
    pub color: String,
    pub opacity: f64,
    pub origin: AnnotationOrigin,
}

impl HighlightAnnotation {
    /// Diff highlight for one mapped rectangle
    pub fn diff(kind: HighlightKind, page_index: u32, rect: PdfRect, style: &HighlightStyle) -> Self {
        let color = match kind {
            HighlightKind::Insertion => &style.insertion_color,
            HighlightKind::Deletion => &style.deletion_color,
        };
        Self {
            page_index,
            rect,
            kind,
            color: color.clone(),
            opacity: style.opacity,
            origin: AnnotationOrigin::DiffVisualization,
        }
    }

    /// Whether a host may save this annotation into the document
    pub fn is_persistable(&self) -> bool {
        self.origin == AnnotationOrigin::User
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub insertion_color: String,
    pub deletion_color: String,
    pub opacity: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            insertion_color: "#2E9E4F".to_string(),
            deletion_color: "#D93025".to_string(),
            opacity: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_highlights_are_not_persistable() {
        let style = HighlightStyle::default();
        let highlight = HighlightAnnotation::diff(
            HighlightKind::Deletion,
            0,
            PdfRect::new(0.0, 0.0, 10.0, 10.0),
            &style,
        );
        assert_eq!(highlight.origin, AnnotationOrigin::DiffVisualization);
        assert_eq!(highlight.color, style.deletion_color);
        assert!(!highlight.is_persistable());

        let user = HighlightAnnotation {
            origin: AnnotationOrigin::User,
            ..highlight
        };
        assert!(user.is_persistable());
    }

    #[test]
    fn test_style_partial_override() {
        let style: HighlightStyle = serde_json::from_str(r##"{"insertion_color":"#00FF00"}"##).unwrap();
        assert_eq!(style.insertion_color, "#00FF00");
        assert_eq!(style.deletion_color, HighlightStyle::default().deletion_color);
    }
}
