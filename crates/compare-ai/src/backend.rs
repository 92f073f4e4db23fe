//! AI backend seam
//!
//! The orchestrator only talks to the service through [`AiBackend`], so the
//! HTTPS client and in-process test doubles are interchangeable.

use crate::error::AiError;
use async_trait::async_trait;
use compare_types::{AiAnalysis, AiChangePayload, TaggedChange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub changes: Vec<AiChangePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub changes: Vec<AiChangePayload>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub changes: Vec<TaggedChange>,
}

#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Summary and category set for a whole comparison
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AiAnalysis, AiError>;

    /// Category tags per change
    async fn tag(&self, request: &TagRequest) -> Result<Vec<TaggedChange>, AiError>;
}
