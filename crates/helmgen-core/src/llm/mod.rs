//! Chat-completion integration.
//!
//! The generated prompt is sent to an OpenAI-compatible endpoint through the
//! [`ChatClient`] trait. A run builds one [`ChatSession`] (model resolved up
//! front) and issues a single completion through it.
//!
//! ```text
//! ┌──────────┐     ┌─────────────┐     ┌────────────────────┐
//! │ Pipeline │────▶│ ChatSession │────▶│ ChatClient (trait) │
//! └──────────┘     └─────────────┘     └─────────┬──────────┘
//!                                                ▼
//!                                     ┌────────────────────┐
//!                                     │ OpenAiCompatClient │
//!                                     │  /v1/models        │
//!                                     │  /v1/chat/...      │
//!                                     └────────────────────┘
//! ```

pub mod client;
pub mod openai;
pub mod types;

pub use client::{ChatClient, ChatSession, LlmError, resolve_model};
pub use openai::OpenAiCompatClient;
pub use types::*;

use tracing::debug;

use crate::secrets::ApiKey;

/// Create a chat client from config.
///
/// Fails with [`LlmError::MissingEndpoint`] when `[llm] endpoint` is unset.
pub fn create_client(config: &helmgen_config::LlmConfig) -> Result<Box<dyn ChatClient>, LlmError> {
    let endpoint = config
        .endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(LlmError::MissingEndpoint)?;
    let api_key = ApiKey::from_config(config.api_key.as_deref());
    if api_key.is_placeholder() {
        debug!("no API key configured; sending the placeholder key");
    }
    Ok(Box::new(OpenAiCompatClient::new(endpoint, api_key)))
}
