// Intelligence backend - the generative service that analyses a target company

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout for the HTTP backend
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// What the backend is asked to analyse for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceRequest {
    pub target_company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_context: Option<String>,
    /// The user's message, verbatim
    pub message: String,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Intelligence backend is not configured")]
    NotConfigured,

    #[error("Intelligence request failed: {0}")]
    Request(String),

    #[error("Intelligence backend error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read intelligence response: {0}")]
    InvalidResponse(String),
}

/// A service that produces raw, unnormalized analysis JSON.
pub trait IntelligenceBackend: Send + Sync {
    fn analyze(
        &self,
        request: &IntelligenceRequest,
    ) -> impl Future<Output = Result<Value, BackendError>> + Send;
}

/// Backend reached over HTTP: the request is POSTed as JSON and the response
/// body is returned as JSON, or as a JSON string when it is plain text.
#[derive(Debug, Clone)]
pub struct HttpIntelligenceBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIntelligenceBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("intel-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IntelligenceBackend for HttpIntelligenceBackend {
    async fn analyze(&self, request: &IntelligenceRequest) -> Result<Value, BackendError> {
        log::debug!("Requesting intelligence on {} from {}", request.target_company, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Stand-in used when no endpoint is configured; every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredBackend;

impl IntelligenceBackend for UnconfiguredBackend {
    async fn analyze(&self, _request: &IntelligenceRequest) -> Result<Value, BackendError> {
        Err(BackendError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = IntelligenceRequest {
            target_company: "Initech".to_string(),
            user_company: Some("Globex".to_string()),
            sales_context: None,
            message: "We are Globex and I'd like intel on Initech".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetCompany"], "Initech");
        assert_eq!(json["userCompany"], "Globex");
        assert!(json.get("salesContext").is_none());
    }

    #[test]
    fn test_http_backend_builds() {
        let backend = HttpIntelligenceBackend::new("http://localhost:8787/analyze", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8787/analyze");
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails() {
        let request = IntelligenceRequest {
            target_company: "Initech".to_string(),
            user_company: None,
            sales_context: None,
            message: String::new(),
        };
        assert!(matches!(
            UnconfiguredBackend.analyze(&request).await,
            Err(BackendError::NotConfigured)
        ));
    }
}
