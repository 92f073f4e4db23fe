//! Headless session export
//!
//! Runs a [`ComparisonSession`] against viewers that only record the
//! highlights they are given, so the change list and highlight regions can
//! be printed without a rendering surface.

use anyhow::{Context, Result};
use compare_session::{
    AnnotationId, ComparisonSession, DocumentSide, DocumentViewer, HighlightAnnotation, HighlightStyle, SessionOptions,
    TextComparisonChange, ViewerError,
};
use compare_types::{DocumentComparisonResult, PdfRect};
use serde::Serialize;

#[derive(Debug, Default)]
struct HighlightRecorder {
    highlights: Vec<(AnnotationId, HighlightAnnotation)>,
    next_id: u64,
}

impl DocumentViewer for HighlightRecorder {
    fn add_highlight(&mut self, highlight: HighlightAnnotation) -> Result<AnnotationId, ViewerError> {
        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.highlights.push((id, highlight));
        Ok(id)
    }

    fn remove_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), ViewerError> {
        self.highlights.retain(|(id, _)| !ids.contains(id));
        Ok(())
    }

    fn set_annotations_visible(&mut self, _ids: &[AnnotationId], _visible: bool) -> Result<(), ViewerError> {
        Ok(())
    }

    fn scroll_to(&mut self, _page_index: u32, _rect: Option<PdfRect>) -> Result<(), ViewerError> {
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub changes: Vec<TextComparisonChange>,
    pub original_highlights: Vec<HighlightAnnotation>,
    pub changed_highlights: Vec<HighlightAnnotation>,
}

pub fn session_report(
    result: &DocumentComparisonResult,
    style: HighlightStyle,
    context_words: usize,
) -> Result<SessionReport> {
    let options = SessionOptions {
        style,
        context_words,
        scroll_lock: false,
    };
    let session = ComparisonSession::open(
        HighlightRecorder::default(),
        HighlightRecorder::default(),
        result,
        options,
    )
    .context("Failed to build comparison session")?;

    Ok(SessionReport {
        changes: session.changes().to_vec(),
        original_highlights: highlights_of(session.viewer(DocumentSide::Original)),
        changed_highlights: highlights_of(session.viewer(DocumentSide::Changed)),
    })
}

fn highlights_of(viewer: &HighlightRecorder) -> Vec<HighlightAnnotation> {
    viewer.highlights.iter().map(|(_, h)| h.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use compare_core::{compare_extracted, InMemoryDocument, TextExtractor};
    use compare_session::HighlightKind;
    use compare_types::TextComparisonOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_lists_changes_and_highlights() {
        let extractor = TextExtractor::default();
        let original = extractor
            .extract(&InMemoryDocument::from_pages(&["The cat sat."]), None)
            .unwrap();
        let changed = extractor
            .extract(&InMemoryDocument::from_pages(&["The dog sat down."]), None)
            .unwrap();
        let result = compare_extracted(&original, &changed, &TextComparisonOptions::word_level()).unwrap();

        let report = session_report(&result, HighlightStyle::default(), 5).unwrap();
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.original_highlights.len(), 1);
        assert_eq!(report.changed_highlights.len(), 2);
        assert!(report
            .original_highlights
            .iter()
            .all(|h| h.kind == HighlightKind::Deletion));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["changes"][0]["operationType"], "replace");
        assert_eq!(json["changes"][0]["deletedText"], "cat");
    }
}
