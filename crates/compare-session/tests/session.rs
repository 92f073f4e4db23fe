use compare_core::{compare_extracted, InMemoryDocument, TextExtractor};
use compare_session::{
    AnnotationId, AnnotationOrigin, ComparisonSession, DocumentSide, DocumentViewer, HighlightAnnotation,
    HighlightKind, HighlightStyle, SessionError, SessionEvent, SessionOptions, ViewerError,
};
use compare_types::{DocumentComparisonResult, PdfRect, TextComparisonOptions};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::assert_ok;

#[derive(Debug, Default)]
struct ViewerLog {
    highlights: BTreeMap<AnnotationId, HighlightAnnotation>,
    hidden: BTreeSet<AnnotationId>,
    scrolls: Vec<(u32, Option<PdfRect>)>,
    next_id: u64,
}

/// In-memory viewer recording everything the session asks of it
#[derive(Clone, Default)]
struct RecordingViewer {
    log: Arc<Mutex<ViewerLog>>,
    destroyed: Arc<AtomicBool>,
    /// Reject highlights once this many were added
    capacity: Option<usize>,
}

impl RecordingViewer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn highlights(&self) -> Vec<HighlightAnnotation> {
        self.log.lock().unwrap().highlights.values().cloned().collect()
    }

    fn hidden(&self) -> usize {
        self.log.lock().unwrap().hidden.len()
    }

    fn scrolls(&self) -> Vec<(u32, Option<PdfRect>)> {
        self.log.lock().unwrap().scrolls.clone()
    }
}

impl DocumentViewer for RecordingViewer {
    fn add_highlight(&mut self, highlight: HighlightAnnotation) -> Result<AnnotationId, ViewerError> {
        let mut log = self.log.lock().unwrap();
        if self.capacity.is_some_and(|c| log.highlights.len() >= c) {
            return Err(ViewerError("annotation store full".to_string()));
        }
        log.next_id += 1;
        let id = AnnotationId(log.next_id);
        log.highlights.insert(id, highlight);
        Ok(id)
    }

    fn remove_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), ViewerError> {
        let mut log = self.log.lock().unwrap();
        for id in ids {
            log.highlights.remove(id);
            log.hidden.remove(id);
        }
        Ok(())
    }

    fn set_annotations_visible(&mut self, ids: &[AnnotationId], visible: bool) -> Result<(), ViewerError> {
        let mut log = self.log.lock().unwrap();
        for id in ids {
            if visible {
                log.hidden.remove(id);
            } else {
                log.hidden.insert(*id);
            }
        }
        Ok(())
    }

    fn scroll_to(&mut self, page_index: u32, rect: Option<PdfRect>) -> Result<(), ViewerError> {
        self.log.lock().unwrap().scrolls.push((page_index, rect));
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

fn diff(original: &[&str], changed: &[&str]) -> DocumentComparisonResult {
    let extractor = TextExtractor::default();
    let original = extractor
        .extract(&InMemoryDocument::from_pages(original), None)
        .unwrap();
    let changed = extractor
        .extract(&InMemoryDocument::from_pages(changed), None)
        .unwrap();
    compare_extracted(&original, &changed, &TextComparisonOptions::word_level()).unwrap()
}

struct Fixture {
    session: ComparisonSession<RecordingViewer>,
    original: RecordingViewer,
    changed: RecordingViewer,
}

fn open(result: &DocumentComparisonResult) -> Fixture {
    let original = RecordingViewer::default();
    let changed = RecordingViewer::default();
    let session = ComparisonSession::open(original.clone(), changed.clone(), result, SessionOptions::default()).unwrap();
    Fixture {
        session,
        original,
        changed,
    }
}

fn two_changes() -> DocumentComparisonResult {
    diff(&["The cat sat."], &["The dog sat down."])
}

fn one_change() -> DocumentComparisonResult {
    diff(&["alpha beta"], &["alpha gamma"])
}

fn two_pages() -> DocumentComparisonResult {
    diff(&["one", "two"], &["one", "three"])
}

#[test]
fn test_next_change_moves_forward_when_several_exist() {
    let mut f = open(&two_changes());
    assert_eq!(f.session.changes().len(), 2);
    assert_eq!(f.session.jump_to_change(0), Ok(0));
    assert_eq!(f.session.go_to_next_change(), Ok(1));
    assert_eq!(f.session.current_change_index(), Some(1));
}

#[test]
fn test_next_change_stays_put_with_single_change() {
    let mut f = open(&one_change());
    assert_eq!(f.session.changes().len(), 1);
    assert_eq!(f.session.jump_to_change(0), Ok(0));
    assert_eq!(f.session.go_to_next_change(), Ok(0));
    assert_eq!(f.session.current_change_index(), Some(0));
}

#[test]
fn test_navigation_clamps_without_wrapping() {
    let mut f = open(&two_changes());
    assert_eq!(f.session.jump_to_change(99), Ok(1));
    assert_eq!(f.session.go_to_next_change(), Ok(1));
    assert_eq!(f.session.go_to_previous_change(), Ok(0));
    assert_eq!(f.session.go_to_previous_change(), Ok(0));
}

#[test]
fn test_first_navigation_starts_at_first_change() {
    let mut f = open(&two_changes());
    assert_eq!(f.session.current_change_index(), None);
    assert_eq!(f.session.go_to_previous_change(), Ok(0));
}

#[test]
fn test_no_changes_cannot_be_navigated() {
    let mut f = open(&diff(&["same"], &["same"]));
    assert!(f.session.changes().is_empty());
    assert_eq!(f.session.jump_to_change(0), Err(SessionError::NoChanges));
    assert_eq!(f.session.go_to_next_change(), Err(SessionError::NoChanges));
}

#[test]
fn test_highlights_land_on_their_side() {
    let f = open(&one_change());
    let style = HighlightStyle::default();

    let deletions = f.original.highlights();
    let insertions = f.changed.highlights();
    assert_eq!(deletions.len(), 1);
    assert_eq!(insertions.len(), 1);

    assert_eq!(deletions[0].kind, HighlightKind::Deletion);
    assert_eq!(deletions[0].color, style.deletion_color);
    assert_eq!(insertions[0].kind, HighlightKind::Insertion);
    assert_eq!(insertions[0].color, style.insertion_color);

    for highlight in deletions.iter().chain(&insertions) {
        assert_eq!(highlight.origin, AnnotationOrigin::DiffVisualization);
        assert!(!highlight.is_persistable());
    }

    let change = &f.session.changes()[0];
    assert_eq!(change.deletion_annotations.len(), 1);
    assert_eq!(change.insertion_annotations.len(), 1);
    assert_eq!(change.deleted_text, "beta");
    assert_eq!(change.inserted_text, "gamma");
}

#[test]
fn test_jump_scrolls_both_viewers_to_the_change() {
    let mut f = open(&two_pages());
    assert_ok!(f.session.jump_to_change(0));

    let original = f.original.scrolls();
    let changed = f.changed.scrolls();
    assert_eq!(original.len(), 1);
    assert_eq!(changed.len(), 1);
    assert_eq!(original[0].0, 1);
    assert_eq!(changed[0].0, 1);
    assert!(original[0].1.is_some());
    assert!(changed[0].1.is_some());
}

#[test]
fn test_visibility_toggle_keeps_changes() {
    let mut f = open(&two_changes());
    let before = f.session.changes().to_vec();

    assert_ok!(f.session.set_comparison_visibility(false));
    assert!(!f.session.comparison_visible());
    assert_eq!(f.original.hidden(), f.original.highlights().len());
    assert_eq!(f.changed.hidden(), f.changed.highlights().len());

    f.session.set_comparison_visibility(true).unwrap();
    assert_eq!(f.original.hidden(), 0);
    assert_eq!(f.changed.hidden(), 0);
    assert_eq!(f.session.changes(), &before[..]);
}

#[test]
fn test_scroll_lock_mirrors_once() {
    let mut f = open(&two_pages());

    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 1), Ok(Some(1)));
    assert_eq!(f.changed.scrolls(), vec![(1, None)]);

    // The changed viewer reports the scroll the session caused
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Changed, 1), Ok(None));
    assert!(f.original.scrolls().is_empty());

    // A real user scroll afterwards is mirrored again
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Changed, 0), Ok(Some(0)));
    assert_eq!(f.original.scrolls(), vec![(0, None)]);
}

#[test]
fn test_scroll_lock_off_does_not_mirror() {
    let mut f = open(&two_pages());
    f.session.set_scroll_lock(false).unwrap();
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 1), Ok(None));
    assert!(f.changed.scrolls().is_empty());
}

#[test]
fn test_jump_scrolls_are_not_mirrored() {
    let mut f = open(&two_pages());
    f.session.jump_to_change(0).unwrap();
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 1), Ok(None));
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Changed, 1), Ok(None));
    assert_eq!(f.original.scrolls().len(), 1);
    assert_eq!(f.changed.scrolls().len(), 1);
}

#[test]
fn test_user_scroll_after_jump_to_current_page_is_mirrored() {
    let mut f = open(&one_change());
    // Both viewers already show page 0, so the host reports no scroll back
    assert_ok!(f.session.jump_to_change(0));

    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 0), Ok(Some(0)));
    assert_eq!(f.changed.scrolls().last(), Some(&(0, None)));
}

#[test]
fn test_missing_echo_does_not_swallow_later_scrolls() {
    let mut f = open(&two_pages());
    assert_ok!(f.session.jump_to_change(0));

    // The host never reported the jump; the user moves on
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 0), Ok(Some(0)));
    assert_eq!(f.session.on_viewer_scrolled(DocumentSide::Original, 1), Ok(Some(1)));
    assert_eq!(f.changed.scrolls().last(), Some(&(1, None)));
}

#[test]
fn test_events_are_emitted_on_state_changes() {
    let mut f = open(&two_changes());
    let mut events = f.session.subscribe();

    f.session.jump_to_change(0).unwrap();
    f.session.jump_to_change(0).unwrap();
    f.session.go_to_next_change().unwrap();
    f.session.set_scroll_lock(false).unwrap();
    f.session.set_scroll_lock(false).unwrap();
    f.session.set_sidebar_visibility(false).unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            SessionEvent::ChangeIndexChange { index: 0 },
            SessionEvent::ChangeIndexChange { index: 1 },
            SessionEvent::ScrollLockChange { enabled: false },
            SessionEvent::ComparisonSidebarVisibilityChange { visible: false },
        ]
    );
}

#[test]
fn test_event_wire_names() {
    let json = serde_json::to_value(SessionEvent::ChangeIndexChange { index: 2 }).unwrap();
    assert_eq!(json, serde_json::json!({"type": "change-index-change", "index": 2}));
    let json = serde_json::to_value(SessionEvent::ComparisonSidebarVisibilityChange { visible: true }).unwrap();
    assert_eq!(json["type"], "comparison-sidebar-visibility-change");
}

#[test]
fn test_torn_down_viewer_closes_session() {
    let mut f = open(&two_changes());
    f.changed.destroy();

    assert_eq!(f.session.jump_to_change(0), Err(SessionError::SessionClosed));
    assert_eq!(f.session.go_to_next_change(), Err(SessionError::SessionClosed));
    assert_eq!(f.session.go_to_previous_change(), Err(SessionError::SessionClosed));
    assert_eq!(f.session.set_scroll_lock(false), Err(SessionError::SessionClosed));
    assert_eq!(
        f.session.on_viewer_scrolled(DocumentSide::Original, 0),
        Err(SessionError::SessionClosed)
    );
}

#[test]
fn test_open_on_torn_down_viewer_fails() {
    let original = RecordingViewer::default();
    original.destroy();
    let result = ComparisonSession::open(
        original,
        RecordingViewer::default(),
        &two_changes(),
        SessionOptions::default(),
    );
    assert!(matches!(result, Err(SessionError::SessionClosed)));
}

#[test]
fn test_close_removes_highlights() {
    let mut f = open(&two_changes());
    assert!(!f.original.highlights().is_empty());
    assert!(!f.changed.highlights().is_empty());

    f.session.close();
    assert!(f.session.is_closed());
    assert!(f.original.highlights().is_empty());
    assert!(f.changed.highlights().is_empty());
    assert_eq!(f.session.jump_to_change(0), Err(SessionError::SessionClosed));

    // Second close is a no-op
    f.session.close();
}

#[test]
fn test_close_skips_torn_down_viewer() {
    let mut f = open(&one_change());
    f.original.destroy();
    f.session.close();
    assert_eq!(f.original.highlights().len(), 1);
    assert!(f.changed.highlights().is_empty());
}

#[test]
fn test_rejected_highlight_rolls_back_open() {
    let original = RecordingViewer::default();
    let changed = RecordingViewer::with_capacity(0);
    let result = ComparisonSession::open(
        original.clone(),
        changed.clone(),
        &one_change(),
        SessionOptions::default(),
    );

    assert!(matches!(result, Err(SessionError::Viewer(_))));
    assert!(original.highlights().is_empty());
    assert!(changed.highlights().is_empty());
}
