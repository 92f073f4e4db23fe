//! AI enrichment of document comparisons
//!
//! Turns a text diff into minimal change payloads, sends them to an AI
//! service for a summary (ANALYZE) or per-change tags (TAG) and tracks the
//! request through the AI comparison phases.

pub mod backend;
pub mod compare;
pub mod config;
pub mod error;
pub mod http;
pub mod jwt;
pub mod orchestrator;
pub mod payload;

pub use backend::{AiBackend, AnalyzeRequest, TagRequest, TagResponse};
pub use compare::{compare_documents, AiDocumentComparisonResult, ComparisonOutcome};
pub use config::AiConfig;
pub use error::AiError;
pub use http::HttpAiBackend;
pub use orchestrator::AiOrchestrator;
pub use payload::{change_payloads, correlate_tags, transform_changes};
