//! Shared data model for document comparison
//!
//! Types in this crate are plain data: they describe text ranges, page
//! rectangles, diff operations and AI enrichment state. All of them serialize
//! with camelCase field names so the JSON shape matches what viewer hosts
//! consume.

pub mod ai;
pub mod comparison;
pub mod geometry;
pub mod range;
pub mod request;

pub use ai::{
    AiAnalysis, AiChangePayload, AiComparisonData, AiComparisonError, AiComparisonPhase,
    AiEnhancedChange, TaggedChange,
};
pub use comparison::{
    ComparisonResult, DocumentComparisonResult, Hunk, Operation, OperationType,
    PageComparisonResult, TextBlock,
};
pub use geometry::PdfRect;
pub use range::{CoordinateUnit, TextRange};
pub use request::{
    AiComparisonOptions, AiOperationType, ComparisonOperation, PageSelector,
    TextComparisonOptions, DEFAULT_CONTEXT_WORDS,
};
