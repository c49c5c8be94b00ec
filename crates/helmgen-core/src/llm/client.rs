//! Chat client trait and the initialized session built on top of it.
//!
//! A [`ChatSession`] is created once per run: it resolves the model, then
//! issues exactly one completion. It is passed explicitly to whatever needs
//! it, so tests can swap in a stub [`ChatClient`].

use tracing::{debug, info};

use crate::BoxFuture;

use super::types::{ChatMessage, ChatRequest, ChatResponse, Sampling};

/// Errors from chat endpoint calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm.endpoint is not configured")]
    MissingEndpoint,

    #[error("no models found in endpoint {0}")]
    NoModels(String),

    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error: {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

impl LlmError {
    /// Whether the failure may go away on its own (network trouble, server
    /// errors) as opposed to needing a configuration change.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::ProviderError { status, .. } => *status == 429 || *status >= 500,
            LlmError::MissingEndpoint
            | LlmError::NoModels(_)
            | LlmError::Auth(_)
            | LlmError::Parse(_) => false,
        }
    }
}

/// A chat-completion backend.
///
/// Uses `BoxFuture` for object safety (allows `Box<dyn ChatClient>`).
pub trait ChatClient: Send + Sync {
    /// Client display name (e.g. "OpenAI-compatible").
    fn name(&self) -> &str;

    /// The endpoint base URL, used in diagnostics.
    fn endpoint(&self) -> &str;

    /// List the model identifiers the endpoint serves, in endpoint order.
    fn list_models(&self) -> BoxFuture<'_, Result<Vec<String>, LlmError>>;

    /// Perform a single non-streaming chat completion.
    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>>;
}

/// Pick the model to use: the explicit one, or the first listed by the endpoint.
pub async fn resolve_model(
    client: &dyn ChatClient,
    explicit: Option<&str>,
) -> Result<String, LlmError> {
    if let Some(model) = explicit.filter(|m| !m.is_empty()) {
        debug!(model, "using configured model");
        return Ok(model.to_string());
    }
    let models = client.list_models().await?;
    models
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::NoModels(client.endpoint().to_string()))
}

/// A chat client bound to a resolved model and sampling parameters.
pub struct ChatSession {
    client: Box<dyn ChatClient>,
    model: String,
    sampling: Sampling,
}

impl ChatSession {
    /// Resolve the model and build the session. Fails with
    /// [`LlmError::NoModels`] when the endpoint lists nothing.
    pub async fn connect(
        client: Box<dyn ChatClient>,
        explicit_model: Option<&str>,
        sampling: Sampling,
    ) -> Result<Self, LlmError> {
        let model = resolve_model(client.as_ref(), explicit_model).await?;
        info!(client = client.name(), endpoint = client.endpoint(), %model, "chat client initialized");
        Ok(Self {
            client,
            model,
            sampling,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` as a single user turn.
    pub async fn complete(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            sampling: self.sampling,
        };
        self.client.chat(&request).await
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("client", &self.client.name())
            .field("model", &self.model)
            .field("sampling", &self.sampling)
            .finish()
    }
}
