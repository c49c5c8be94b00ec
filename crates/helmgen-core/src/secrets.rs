//! In-memory handling of the chat endpoint credential.
//!
//! The key is cleared from memory on drop and never appears in `Debug` output.

use std::fmt;

use zeroize::Zeroizing;

/// Placeholder sent when no key is configured; local OpenAI-compatible
/// servers accept any bearer token.
pub const PLACEHOLDER_KEY: &str = "empty";

/// Bearer token for the chat endpoint.
#[derive(Clone)]
pub struct ApiKey {
    inner: Zeroizing<String>,
}

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(value.into()),
        }
    }

    /// Use the configured key, or [`PLACEHOLDER_KEY`] when there is none.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some(key) if !key.is_empty() => Self::new(key),
            _ => Self::new(PLACEHOLDER_KEY),
        }
    }

    /// Get the key as a string slice.
    ///
    /// Only the HTTP client should call this.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Whether this is the placeholder rather than a real key.
    pub fn is_placeholder(&self) -> bool {
        self.inner.as_str() == PLACEHOLDER_KEY
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("inner", &"[REDACTED]")
            .field("len", &self.inner.len())
            .finish()
    }
}
