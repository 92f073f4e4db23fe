//! Document comparison core
//!
//! Extracts normalized page text from two documents, computes a minimal edit
//! script per page pair and maps every operation back onto page rectangles.
//!
//! ```no_run
//! use compare_core::{Comparator, ComparisonDocument, ComparisonDocuments};
//! use compare_types::TextComparisonOptions;
//!
//! # async fn run() -> Result<(), compare_core::CompareError> {
//! let documents = ComparisonDocuments::new(
//!     ComparisonDocument::text("The cat sat."),
//!     ComparisonDocument::text("The dog sat down."),
//! );
//! let result = Comparator::new()
//!     .compare(&documents, &TextComparisonOptions::word_level())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod comparator;
pub mod compare;
pub mod context;
pub mod diff;
pub mod document;
pub mod error;
pub mod extract;
pub mod pdf;
pub mod selector;
pub mod tokenize;

pub use align::{blocks_for_range, AlignmentMapper};
pub use comparator::{Comparator, ComparisonDocument, ComparisonDocuments};
pub use compare::{compare_extracted, compare_page_pair, pair_pages};
pub use context::{leading_words, trailing_words, ChangeContext};
pub use diff::{group_hunks, DiffEngine};
pub use document::{DocumentSource, InMemoryDocument, LineLayout, TextLine};
pub use error::CompareError;
pub use extract::{normalize_line, ExtractedPage, ExtractedText, TextExtractor};
pub use pdf::PdfDocument;
pub use selector::{parse_page_selectors, resolve_page_indexes};
pub use tokenize::{tokenize, Granularity, Token};
