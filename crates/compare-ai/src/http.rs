//! HTTPS backend
//!
//! POSTs JSON to `{base_url}/analyze` and `{base_url}/tag` with the session
//! JWT as a bearer token.

use crate::backend::{AiBackend, AnalyzeRequest, TagRequest, TagResponse};
use crate::config::AiConfig;
use crate::error::AiError;
use crate::jwt;
use async_trait::async_trait;
use compare_types::{AiAnalysis, TaggedChange};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

pub struct HttpAiBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAiBackend {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AiError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            jwt::ensure_fresh(token, chrono::Utc::now().timestamp())?;
            request = request.bearer_auth(token);
        }

        debug!(url = %url, "Calling AI service");
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AiError::Unauthorized(format!("AI service returned {}", status)));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AiBackend for HttpAiBackend {
    #[instrument(skip_all, fields(changes = request.changes.len()))]
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AiAnalysis, AiError> {
        self.post("analyze", request).await
    }

    #[instrument(skip_all, fields(changes = request.changes.len()))]
    async fn tag(&self, request: &TagRequest) -> Result<Vec<TaggedChange>, AiError> {
        let response: TagResponse = self.post("tag", request).await?;
        Ok(response.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_token_fails_before_network() {
        // Nothing listens on this address; an attempted request would be a Network error
        let config = AiConfig::new("http://127.0.0.1:9").with_token(jwt::test_token(1));
        let backend = HttpAiBackend::new(&config).unwrap();

        let err = backend
            .analyze(&AnalyzeRequest { changes: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Unauthorized(_)));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let backend = HttpAiBackend::new(&AiConfig::new("https://ai.example.com/")).unwrap();
        assert_eq!(backend.base_url, "https://ai.example.com");
    }
}
