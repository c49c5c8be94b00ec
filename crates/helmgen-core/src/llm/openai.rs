//! OpenAI-compatible chat client.
//!
//! Talks to any server exposing `GET /v1/models` and
//! `POST /v1/chat/completions` in the OpenAI shape (vLLM, TGI, Ollama,
//! OpenAI itself). Requests carry no timeout and are never retried.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::BoxFuture;
use crate::secrets::ApiKey;

use super::client::{ChatClient, LlmError};
use super::types::*;

/// OpenAI-compatible client.
pub struct OpenAiCompatClient {
    client: Client,
    api_key: ApiKey,
    endpoint: String,
}

impl OpenAiCompatClient {
    /// Create a client for `endpoint` (base URL without the `/v1` suffix).
    pub fn new(endpoint: impl Into<String>, api_key: ApiKey) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            api_key,
            endpoint,
        }
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.endpoint)
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint)
    }

    /// Convert our ChatRequest into the wire format.
    fn build_request_body(&self, request: &ChatRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| OpenAiMessage {
                    role: msg.role.clone(),
                    content: Some(msg.content.clone()),
                })
                .collect(),
            temperature: request.sampling.temperature,
            frequency_penalty: request.sampling.frequency_penalty,
            presence_penalty: request.sampling.presence_penalty,
            n: 1,
            stream: false,
        }
    }

    /// Parse the wire response into our ChatResponse.
    fn parse_response(&self, resp: OpenAiResponse) -> Result<ChatResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("no choices in response".to_string()))?;

        Ok(ChatResponse {
            message: ChatMessage {
                role: choice.message.role,
                content: choice.message.content.unwrap_or_default(),
            },
            finish_reason: choice
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string()),
            usage: resp.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: resp.model,
        })
    }

    /// Map a non-success status to an error, consuming the body.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = resp.status().as_u16();
        if status == 401 {
            return Err(LlmError::Auth("invalid API key".to_string()));
        }
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::ProviderError { status, message });
        }
        Ok(resp)
    }
}

impl ChatClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn list_models(&self) -> BoxFuture<'_, Result<Vec<String>, LlmError>> {
        Box::pin(async move {
            let url = self.models_url();
            debug!(%url, "listing models");

            let resp = self
                .client
                .get(&url)
                .bearer_auth(self.api_key.expose())
                .send()
                .await
                .map_err(|e| LlmError::Network(e.to_string()))?;
            let resp = Self::check_status(resp).await?;

            let list: ModelList = resp
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;
            Ok(list.data.into_iter().map(|m| m.id).collect())
        })
    }

    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>> {
        let body = self.build_request_body(request);
        Box::pin(async move {
            debug!(model = %body.model, "chat completion request");

            let resp = self
                .client
                .post(self.completions_url())
                .bearer_auth(self.api_key.expose())
                .json(&body)
                .send()
                .await
                .map_err(|e| LlmError::Network(e.to_string()))?;
            let resp = Self::check_status(resp).await?;

            let api_resp: OpenAiResponse = resp
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;

            self.parse_response(api_resp)
        })
    }
}

// ── Wire types (private) ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    n: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
