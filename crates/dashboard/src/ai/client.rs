//! Claude API client (non-streaming Messages API).

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::error::{AiError, ApiErrorResponse};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl ClaudeClient {
    /// Create a client for the public Anthropic endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AiError::InvalidInput` if the API key is not a valid header
    /// value, or `AiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, AiError> {
        Self::with_endpoint(config, ANTHROPIC_API_URL)
    }

    /// Create a client that posts to `endpoint` instead of the public API.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_endpoint(config: &ClaudeConfig, endpoint: &str) -> Result<Self, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|_| AiError::InvalidInput("API key is not a valid header".to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                endpoint: endpoint.to_string(),
                model: config.model.clone(),
            }),
        })
    }

    /// Send a conversation and get the complete reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API returns an error.
    #[instrument(skip(self, messages, system), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, AiError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let reply: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::Parse(format!("Failed to parse response: {e}")))?;
        tracing::debug!(
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            "Model replied"
        );
        Ok(reply)
    }
}

async fn handle_error_status(status: reqwest::StatusCode, response: reqwest::Response) -> AiError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return AiError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return AiError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
            |_| AiError::Api {
                error_type: "unknown".to_string(),
                message: body.clone(),
            },
            |api_error| AiError::Api {
                error_type: api_error.error.error_type,
                message: api_error.error.message,
            },
        ),
        Err(e) => AiError::Http(e),
    }
}
