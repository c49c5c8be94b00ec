//! Common types for chat completions.

use serde::{Deserialize, Serialize};

/// A chat message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.01,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl From<&helmgen_config::LlmConfig> for Sampling {
    fn from(config: &helmgen_config::LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Model identifier as listed by the endpoint.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    pub sampling: Sampling,
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's response message.
    pub message: ChatMessage,
    /// Finish reason: "stop", "length", etc.
    pub finish_reason: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model identifier reported by the endpoint.
    pub model: String,
}

impl ChatResponse {
    /// The generated text.
    pub fn content(&self) -> &str {
        &self.message.content
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "prompt_tokens={} completion_tokens={} total_tokens={}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}
