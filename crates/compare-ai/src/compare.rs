//! Comparison entry point
//!
//! [`compare_documents`] runs a text comparison and, for AI operations, the
//! AI pass on top of it. The result is an explicit tagged variant so callers
//! match on it instead of probing its shape.

use crate::error::AiError;
use crate::orchestrator::AiOrchestrator;
use compare_core::{Comparator, ComparisonDocuments};
use compare_types::{
    AiComparisonData, AiOperationType, ComparisonOperation, DocumentComparisonResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Text diff plus the AI record built on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operationType", rename_all = "lowercase")]
pub enum AiDocumentComparisonResult {
    Analyze {
        comparison: DocumentComparisonResult,
        data: AiComparisonData,
    },
    Tag {
        comparison: DocumentComparisonResult,
        data: AiComparisonData,
    },
}

impl AiDocumentComparisonResult {
    pub fn is_analysis(&self) -> bool {
        matches!(self, AiDocumentComparisonResult::Analyze { .. })
    }

    pub fn is_tagging(&self) -> bool {
        matches!(self, AiDocumentComparisonResult::Tag { .. })
    }

    pub fn comparison(&self) -> &DocumentComparisonResult {
        match self {
            AiDocumentComparisonResult::Analyze { comparison, .. }
            | AiDocumentComparisonResult::Tag { comparison, .. } => comparison,
        }
    }

    pub fn data(&self) -> &AiComparisonData {
        match self {
            AiDocumentComparisonResult::Analyze { data, .. }
            | AiDocumentComparisonResult::Tag { data, .. } => data,
        }
    }
}

/// Result of [`compare_documents`], discriminated by the requested operation
///
/// `None` means the comparison was superseded by a newer one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComparisonOutcome {
    Text {
        result: Option<DocumentComparisonResult>,
    },
    Ai {
        result: Option<AiDocumentComparisonResult>,
    },
}

impl ComparisonOutcome {
    /// The text diff, whatever the operation
    pub fn comparison(&self) -> Option<&DocumentComparisonResult> {
        match self {
            ComparisonOutcome::Text { result } => result.as_ref(),
            ComparisonOutcome::Ai { result } => result.as_ref().map(|r| r.comparison()),
        }
    }

    pub fn is_analysis(&self) -> bool {
        matches!(self, ComparisonOutcome::Ai { result: Some(r) } if r.is_analysis())
    }

    pub fn is_tagging(&self) -> bool {
        matches!(self, ComparisonOutcome::Ai { result: Some(r) } if r.is_tagging())
    }
}

/// Compare two documents
///
/// Input and extraction errors abort before any result exists. AI failures
/// do not: the outcome carries the text diff and an AI record in the
/// `Error` phase.
///
/// Every call supersedes the previous one on the same comparator and
/// orchestrator: an AI request still in flight is cancelled, and its caller
/// gets an outcome without a result.
#[instrument(skip_all)]
pub async fn compare_documents(
    comparator: &Comparator,
    orchestrator: &AiOrchestrator,
    documents: &ComparisonDocuments,
    operation: &ComparisonOperation,
) -> Result<ComparisonOutcome, AiError> {
    orchestrator.cancel();
    let result = comparator
        .compare(documents, operation.text_options())
        .await?;
    let generation = comparator.generation();

    let options = match operation {
        ComparisonOperation::Text(_) => return Ok(ComparisonOutcome::Text { result }),
        ComparisonOperation::Ai(options) => options,
    };
    let Some(comparison) = result else {
        return Ok(ComparisonOutcome::Ai { result: None });
    };

    let diff = Arc::new(comparison);
    let data = match orchestrator.run(Arc::clone(&diff), options.clone()).await {
        Ok(data) => data,
        Err(AiError::Cancelled) => return Ok(ComparisonOutcome::Ai { result: None }),
        Err(err) => return Err(err),
    };
    if comparator.generation() != generation {
        debug!(generation, "AI result belongs to a superseded comparison");
        return Ok(ComparisonOutcome::Ai { result: None });
    }

    let comparison = Arc::unwrap_or_clone(diff);
    let result = match options.operation_type {
        AiOperationType::Analyze => AiDocumentComparisonResult::Analyze { comparison, data },
        AiOperationType::Tag => AiDocumentComparisonResult::Tag { comparison, data },
    };
    Ok(ComparisonOutcome::Ai {
        result: Some(result),
    })
}
