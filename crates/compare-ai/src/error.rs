use compare_core::CompareError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("AI service unreachable: {0}")]
    Network(String),

    #[error("AI service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Failed to decode AI service response: {0}")]
    Decode(String),

    #[error("Not authorized to call the AI service: {0}")]
    Unauthorized(String),

    #[error("AI comparison was superseded by a newer request")]
    Cancelled,

    #[error(transparent)]
    Compare(#[from] CompareError),
}

impl AiError {
    /// Extra detail for the error record shown next to the AI panel
    pub fn details(&self) -> Option<String> {
        match self {
            AiError::Service { status, .. } => Some(format!("HTTP {}", status)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AiError::Service {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AiError::Network(err.to_string())
        }
    }
}
