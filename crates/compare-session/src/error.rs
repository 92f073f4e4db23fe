use thiserror::Error;

/// Failure reported by a viewer implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ViewerError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Comparison session is closed")]
    SessionClosed,

    #[error("Comparison has no changes to navigate")]
    NoChanges,

    #[error("Viewer error: {0}")]
    Viewer(#[from] ViewerError),
}
