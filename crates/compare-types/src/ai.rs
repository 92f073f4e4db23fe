//! AI enrichment state
//!
//! `AiComparisonData` is written by exactly one orchestrator and read by any
//! number of observers. Phase changes go through [`AiComparisonData::advance`]
//! and [`AiComparisonData::fail`], which enforce the forward-only state machine.

use crate::comparison::OperationType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiComparisonPhase {
    #[default]
    Idle,
    Loading,
    Analyzing,
    Tagging,
    Completed,
    Error,
}

impl AiComparisonPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, AiComparisonPhase::Completed | AiComparisonPhase::Error)
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_advance_to(self, next: AiComparisonPhase) -> bool {
        use AiComparisonPhase::*;
        match (self, next) {
            (from, Error) => !from.is_terminal(),
            (Idle, Loading) => true,
            (Loading, Analyzing) | (Loading, Tagging) => true,
            (Analyzing, Completed) | (Tagging, Completed) => true,
            _ => false,
        }
    }
}

/// Error record stamped with the phase that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiComparisonError {
    pub phase: AiComparisonPhase,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Minimal per-change payload sent to the AI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChangePayload {
    pub id: String,
    #[serde(rename = "type")]
    pub change_type: OperationType,
    pub text: String,
    pub context_before: String,
    pub context_after: String,
    /// Page the change is visible on (changed document for insertions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Category tags the service assigned to one change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedChange {
    pub id: String,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub summary: String,
    pub categories: Vec<String>,
}

/// A sent change joined with the tags it received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEnhancedChange {
    #[serde(flatten)]
    pub change: AiChangePayload,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiComparisonData {
    pub summary: Option<String>,
    pub categories: Vec<String>,
    /// Every change of the underlying diff, as payloads
    pub changes: Vec<AiChangePayload>,
    pub phase: AiComparisonPhase,
    pub error: Option<AiComparisonError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged_changes: Option<Vec<TaggedChange>>,
    /// Payloads actually sent to the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_changes: Option<Vec<AiChangePayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhanced_changes: Option<Vec<AiEnhancedChange>>,
}

impl AiComparisonData {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Move to `next` if the transition is legal. Returns whether it happened.
    pub fn advance(&mut self, next: AiComparisonPhase) -> bool {
        if self.phase.can_advance_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }

    /// Record a failure of the current phase and enter `Error`
    ///
    /// Does nothing once a terminal phase is reached.
    pub fn fail(&mut self, message: impl Into<String>, details: Option<String>) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.error = Some(AiComparisonError {
            phase: self.phase,
            message: message.into(),
            details,
        });
        self.phase = AiComparisonPhase::Error;
        true
    }

    pub fn has_analysis(&self) -> bool {
        self.summary.is_some()
    }

    pub fn has_tags(&self) -> bool {
        self.tagged_changes.is_some()
    }

    /// Drop the results of the tagging stage
    pub fn clear_tags(&mut self) {
        self.tagged_changes = None;
        self.ai_enhanced_changes = None;
    }

    /// Drop the results of the analysis stage
    pub fn clear_analysis(&mut self) {
        self.summary = None;
        self.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AiComparisonPhase::*;

    #[test]
    fn test_forward_path() {
        let mut data = AiComparisonData::idle();
        assert!(data.advance(Loading));
        assert!(data.advance(Tagging));
        assert!(data.advance(Completed));
        assert_eq!(data.phase, Completed);
    }

    #[test]
    fn test_backward_transition_rejected() {
        let mut data = AiComparisonData::idle();
        data.advance(Loading);
        data.advance(Analyzing);
        assert!(!data.advance(Loading));
        assert!(!data.advance(Tagging));
        assert_eq!(data.phase, Analyzing);
    }

    #[test]
    fn test_fail_stamps_phase() {
        let mut data = AiComparisonData::idle();
        data.advance(Loading);
        data.advance(Analyzing);
        assert!(data.fail("timeout", Some("after 30s".into())));
        let error = data.error.as_ref().unwrap();
        assert_eq!(error.phase, Analyzing);
        assert_eq!(data.phase, Error);
    }

    #[test]
    fn test_error_is_terminal() {
        let mut data = AiComparisonData::idle();
        data.fail("boom", None);
        assert!(!data.fail("again", None));
        assert!(!data.advance(Loading));
        assert_eq!(data.error.as_ref().unwrap().message, "boom");
    }

    #[test]
    fn test_completed_cannot_fail() {
        let mut data = AiComparisonData::idle();
        data.advance(Loading);
        data.advance(Analyzing);
        data.advance(Completed);
        assert!(!data.fail("late", None));
        assert!(data.error.is_none());
    }

    #[test]
    fn test_phase_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Tagging).unwrap(), r#""TAGGING""#);
    }

    #[test]
    fn test_enhanced_change_flattens_payload() {
        let enhanced = AiEnhancedChange {
            change: AiChangePayload {
                id: "0:1:2".into(),
                change_type: OperationType::Insert,
                text: "dog".into(),
                context_before: "The".into(),
                context_after: "sat".into(),
                page: Some(0),
            },
            categories: vec!["Content".into()],
            explanation: None,
        };
        let json = serde_json::to_value(&enhanced).unwrap();
        assert_eq!(json["id"], "0:1:2");
        assert_eq!(json["type"], "insert");
        assert_eq!(json["categories"][0], "Content");
    }
}
