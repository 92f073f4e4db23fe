use compare_types::CoordinateUnit;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("Page index {page_index} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page_index: u32, page_count: u32 },

    #[error("Invalid page selector: {0}")]
    InvalidSelector(String),

    #[error("Document is encrypted and no password was supplied")]
    PasswordRequired,

    #[error("Password does not unlock the document")]
    InvalidPassword,

    #[error("Failed to parse document: {0}")]
    ParseError(String),

    #[error("Text extraction failed on page {page_index}: {message}")]
    ExtractionError { page_index: u32, message: String },

    #[error("Coordinate unit mismatch: expected {expected:?}, got {found:?}")]
    UnitMismatch {
        expected: CoordinateUnit,
        found: CoordinateUnit,
    },

    #[error("Comparison task failed: {0}")]
    TaskFailed(String),
}

impl CompareError {
    /// Errors caused by the request itself, raised before any extraction
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CompareError::PageOutOfRange { .. }
                | CompareError::InvalidSelector(_)
                | CompareError::PasswordRequired
                | CompareError::InvalidPassword
        )
    }
}
