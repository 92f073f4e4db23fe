//! Comparison session
//!
//! A [`ComparisonSession`] owns the original and changed viewers for its
//! whole lifetime. It is created with [`ComparisonSession::open`], which
//! draws the diff highlights, and torn down with [`ComparisonSession::close`],
//! which removes them again.

use crate::annotation::{AnnotationId, HighlightAnnotation, HighlightKind, HighlightStyle};
use crate::change::{collect_changes, TextComparisonChange};
use crate::error::{SessionError, ViewerError};
use crate::events::{SessionEvent, EVENT_CAPACITY};
use crate::viewer::{DocumentSide, DocumentViewer};
use compare_types::DocumentComparisonResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub style: HighlightStyle,
    pub context_words: usize,
    pub scroll_lock: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            style: HighlightStyle::default(),
            context_words: 5,
            scroll_lock: true,
        }
    }
}

/// Page correspondence between the two documents, from the diff's page pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMap {
    to_changed: BTreeMap<u32, u32>,
    to_original: BTreeMap<u32, u32>,
}

impl PageMap {
    pub fn from_result(result: &DocumentComparisonResult) -> Self {
        let mut map = Self::default();
        for (original, changed) in result.page_pairs() {
            if let (Some(original), Some(changed)) = (original, changed) {
                map.to_changed.insert(original, changed);
                map.to_original.insert(changed, original);
            }
        }
        map
    }

    /// Page of the other document matching `page_index` on `side`
    ///
    /// Unpaired pages map through the closest paired page before them.
    pub fn counterpart(&self, side: DocumentSide, page_index: u32) -> Option<u32> {
        let map = match side {
            DocumentSide::Original => &self.to_changed,
            DocumentSide::Changed => &self.to_original,
        };
        map.range(..=page_index).next_back().map(|(_, &page)| page)
    }
}

/// Scroll positions as the session knows them, per side
///
/// Viewers start on their first page.
/// A scroll the session issues to a page the viewer is not showing yet is
/// expected to come back as one scroll event from that side. Each side holds
/// at most one such echo and any event from the side consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ScrollTracker {
    pages: [u32; 2],
    echoes: [Option<u32>; 2],
}

impl ScrollTracker {
    fn slot(side: DocumentSide) -> usize {
        match side {
            DocumentSide::Original => 0,
            DocumentSide::Changed => 1,
        }
    }

    /// Note a scroll the session issued itself
    fn issued(&mut self, side: DocumentSide, page_index: u32) {
        let slot = Self::slot(side);
        self.echoes[slot] = (self.pages[slot] != page_index).then_some(page_index);
        self.pages[slot] = page_index;
    }

    /// Note a scroll the host observed. Returns whether it is an echo.
    fn observed(&mut self, side: DocumentSide, page_index: u32) -> bool {
        let slot = Self::slot(side);
        self.pages[slot] = page_index;
        self.echoes[slot].take() == Some(page_index)
    }

    fn forget_echoes(&mut self) {
        self.echoes = [None; 2];
    }
}

pub struct ComparisonSession<V: DocumentViewer> {
    original: V,
    changed: V,
    changes: Vec<TextComparisonChange>,
    current: Option<usize>,
    pages: PageMap,
    scroll_lock: bool,
    comparison_visible: bool,
    sidebar_visible: bool,
    scrolls: ScrollTracker,
    closed: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl<V: DocumentViewer> ComparisonSession<V> {
    /// Take ownership of both viewers and highlight every change
    ///
    /// If a viewer rejects a highlight, the highlights added so far are
    /// removed again and the error is returned.
    pub fn open(
        original: V,
        changed: V,
        result: &DocumentComparisonResult,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut session = Self {
            original,
            changed,
            changes: collect_changes(result, options.context_words),
            current: None,
            pages: PageMap::from_result(result),
            scroll_lock: options.scroll_lock,
            comparison_visible: true,
            sidebar_visible: true,
            scrolls: ScrollTracker::default(),
            closed: false,
            events,
        };
        session.ensure_open()?;

        if let Err(err) = session.draw_highlights(&options.style) {
            session.remove_highlights();
            return Err(err.into());
        }

        info!(changes = session.changes.len(), "Opened comparison session");
        Ok(session)
    }

    fn draw_highlights(&mut self, style: &HighlightStyle) -> Result<(), ViewerError> {
        for change in &mut self.changes {
            for block in &change.deletion_blocks {
                let highlight = HighlightAnnotation::diff(HighlightKind::Deletion, block.page_index, block.rect, style);
                change.deletion_annotations.push(self.original.add_highlight(highlight)?);
            }
            for block in &change.insertion_blocks {
                let highlight = HighlightAnnotation::diff(HighlightKind::Insertion, block.page_index, block.rect, style);
                change.insertion_annotations.push(self.changed.add_highlight(highlight)?);
            }
        }
        Ok(())
    }

    fn annotation_ids(&self, side: DocumentSide) -> Vec<AnnotationId> {
        self.changes
            .iter()
            .flat_map(|c| match side {
                DocumentSide::Original => c.deletion_annotations.iter(),
                DocumentSide::Changed => c.insertion_annotations.iter(),
            })
            .copied()
            .collect()
    }

    /// Best-effort removal of every highlight from the viewers still alive
    fn remove_highlights(&mut self) {
        for side in [DocumentSide::Original, DocumentSide::Changed] {
            let ids = self.annotation_ids(side);
            let viewer = self.viewer_mut(side);
            if ids.is_empty() || viewer.is_destroyed() {
                continue;
            }
            if let Err(err) = viewer.remove_annotations(&ids) {
                warn!(?side, error = %err, "Failed to remove comparison highlights");
            }
        }
        for change in &mut self.changes {
            change.deletion_annotations.clear();
            change.insertion_annotations.clear();
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed || self.original.is_destroyed() || self.changed.is_destroyed() {
            return Err(SessionError::SessionClosed);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn changes(&self) -> &[TextComparisonChange] {
        &self.changes
    }

    /// Index of the focused change, `None` before the first navigation
    pub fn current_change_index(&self) -> Option<usize> {
        self.current
    }

    pub fn viewer(&self, side: DocumentSide) -> &V {
        match side {
            DocumentSide::Original => &self.original,
            DocumentSide::Changed => &self.changed,
        }
    }

    fn viewer_mut(&mut self, side: DocumentSide) -> &mut V {
        match side {
            DocumentSide::Original => &mut self.original,
            DocumentSide::Changed => &mut self.changed,
        }
    }

    pub fn page_map(&self) -> &PageMap {
        &self.pages
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Focus the change at `index`, clamped to the change list
    ///
    /// Both viewers scroll to the change. Returns the resolved index.
    pub fn jump_to_change(&mut self, index: usize) -> Result<usize, SessionError> {
        self.ensure_open()?;
        let last = self.changes.len().checked_sub(1).ok_or(SessionError::NoChanges)?;
        let index = index.min(last);

        for side in [DocumentSide::Original, DocumentSide::Changed] {
            if let Some((page_index, rect)) = self.changes[index].scroll_target(side) {
                self.viewer_mut(side).scroll_to(page_index, rect)?;
                self.scrolls.issued(side, page_index);
            }
        }

        debug!(index, "Jumped to change");
        if self.current != Some(index) {
            self.current = Some(index);
            self.emit(SessionEvent::ChangeIndexChange { index });
        }
        Ok(index)
    }

    pub fn go_to_next_change(&mut self) -> Result<usize, SessionError> {
        let next = self.current.map_or(0, |i| i.saturating_add(1));
        self.jump_to_change(next)
    }

    pub fn go_to_previous_change(&mut self) -> Result<usize, SessionError> {
        let previous = self.current.map_or(0, |i| i.saturating_sub(1));
        self.jump_to_change(previous)
    }

    pub fn scroll_lock(&self) -> bool {
        self.scroll_lock
    }

    pub fn set_scroll_lock(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.scrolls.forget_echoes();
        if self.scroll_lock != enabled {
            self.scroll_lock = enabled;
            self.emit(SessionEvent::ScrollLockChange { enabled });
        }
        Ok(())
    }

    pub fn comparison_visible(&self) -> bool {
        self.comparison_visible
    }

    /// Show or hide the diff highlights; the change list is kept
    pub fn set_comparison_visibility(&mut self, visible: bool) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.comparison_visible == visible {
            return Ok(());
        }
        for side in [DocumentSide::Original, DocumentSide::Changed] {
            let ids = self.annotation_ids(side);
            if !ids.is_empty() {
                self.viewer_mut(side).set_annotations_visible(&ids, visible)?;
            }
        }
        self.comparison_visible = visible;
        Ok(())
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    pub fn set_sidebar_visibility(&mut self, visible: bool) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.sidebar_visible != visible {
            self.sidebar_visible = visible;
            self.emit(SessionEvent::ComparisonSidebarVisibilityChange { visible });
        }
        Ok(())
    }

    /// Report a scroll the host observed in one viewer
    ///
    /// With scroll lock on, the other viewer follows to the matching page,
    /// which is returned. Scrolls the session caused itself are swallowed
    /// once so mirroring never bounces back and forth.
    pub fn on_viewer_scrolled(&mut self, side: DocumentSide, page_index: u32) -> Result<Option<u32>, SessionError> {
        self.ensure_open()?;
        if self.scrolls.observed(side, page_index) {
            return Ok(None);
        }
        if !self.scroll_lock {
            return Ok(None);
        }

        let Some(target) = self.pages.counterpart(side, page_index) else {
            return Ok(None);
        };
        let other = side.other();
        self.viewer_mut(other).scroll_to(target, None)?;
        self.scrolls.issued(other, target);
        debug!(?side, page_index, target, "Mirrored scroll");
        Ok(Some(target))
    }

    /// Remove every diff highlight and close the session
    ///
    /// Viewers that were already torn down are skipped. Closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.remove_highlights();
        self.scrolls.forget_echoes();
        self.closed = true;
        info!("Closed comparison session");
    }

    /// Close the session and hand the viewers back
    pub fn into_viewers(mut self) -> (V, V) {
        self.close();
        (self.original, self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compare_types::PageComparisonResult;

    fn pairs(pairs: &[(Option<u32>, Option<u32>)]) -> DocumentComparisonResult {
        DocumentComparisonResult {
            document_comparison_results: pairs
                .iter()
                .map(|&(original_page_index, changed_page_index)| PageComparisonResult {
                    original_page_index,
                    changed_page_index,
                    comparison_results: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_scroll_to_current_page_expects_no_echo() {
        let mut scrolls = ScrollTracker::default();
        scrolls.issued(DocumentSide::Original, 0);
        assert!(!scrolls.observed(DocumentSide::Original, 0));
    }

    #[test]
    fn test_echo_is_consumed_by_any_event_from_its_side() {
        let mut scrolls = ScrollTracker::default();
        scrolls.issued(DocumentSide::Changed, 3);
        assert!(!scrolls.observed(DocumentSide::Original, 3));
        assert!(!scrolls.observed(DocumentSide::Changed, 1));
        assert!(!scrolls.observed(DocumentSide::Changed, 3));

        scrolls.issued(DocumentSide::Changed, 5);
        scrolls.issued(DocumentSide::Changed, 6);
        assert!(!scrolls.observed(DocumentSide::Changed, 5));
    }

    #[test]
    fn test_page_map_pairs_in_order() {
        let map = PageMap::from_result(&pairs(&[(Some(0), Some(1)), (Some(2), Some(3))]));
        assert_eq!(map.counterpart(DocumentSide::Original, 0), Some(1));
        assert_eq!(map.counterpart(DocumentSide::Original, 2), Some(3));
        assert_eq!(map.counterpart(DocumentSide::Changed, 3), Some(2));
    }

    #[test]
    fn test_page_map_unpaired_pages() {
        let map = PageMap::from_result(&pairs(&[(Some(1), Some(0)), (Some(2), None)]));
        // Before any pair
        assert_eq!(map.counterpart(DocumentSide::Original, 0), None);
        // Surplus page follows the last pair
        assert_eq!(map.counterpart(DocumentSide::Original, 2), Some(0));
        assert_eq!(map.counterpart(DocumentSide::Changed, 5), Some(1));
    }
}
