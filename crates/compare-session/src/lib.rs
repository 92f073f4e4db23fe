//! Dual-viewer navigation over a document comparison
//!
//! [`ComparisonSession`] takes two [`DocumentViewer`]s and a
//! [`DocumentComparisonResult`](compare_types::DocumentComparisonResult),
//! highlights every change, and keeps the viewers in step while the user
//! moves through the change list.

pub mod annotation;
pub mod change;
pub mod error;
pub mod events;
pub mod session;
pub mod viewer;

pub use annotation::{AnnotationId, AnnotationOrigin, HighlightAnnotation, HighlightKind, HighlightStyle};
pub use change::{collect_changes, ChangeOperationType, DocumentPage, TextComparisonChange};
pub use error::{SessionError, ViewerError};
pub use events::{SessionEvent, EVENT_CAPACITY};
pub use session::{ComparisonSession, PageMap, SessionOptions};
pub use viewer::{DocumentSide, DocumentViewer};
