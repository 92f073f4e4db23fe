//! Viewer seam
//!
//! A viewer renders one document and hosts its annotations. The session
//! drives two of them and never reaches past this trait.

use crate::annotation::{AnnotationId, HighlightAnnotation};
use crate::error::ViewerError;
use compare_types::PdfRect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Original,
    Changed,
}

impl DocumentSide {
    pub fn other(self) -> Self {
        match self {
            DocumentSide::Original => DocumentSide::Changed,
            DocumentSide::Changed => DocumentSide::Original,
        }
    }
}

pub trait DocumentViewer: Send {
    fn add_highlight(&mut self, highlight: HighlightAnnotation) -> Result<AnnotationId, ViewerError>;

    fn remove_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), ViewerError>;

    fn set_annotations_visible(&mut self, ids: &[AnnotationId], visible: bool) -> Result<(), ViewerError>;

    /// Bring a page into view, centered on `rect` when given
    fn scroll_to(&mut self, page_index: u32, rect: Option<PdfRect>) -> Result<(), ViewerError>;

    /// Whether the host tore the viewer down
    fn is_destroyed(&self) -> bool;
}
