//! AI provider integrations

mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned no reply")]
    EmptyReply,
}

/// One request, one complete reply.
///
/// Implementations send `system_instruction` and `user_message` as a
/// two-message conversation and return the first choice's text. No retries.
#[async_trait]
pub trait ReplyFetcher: Send + Sync {
    async fn fetch_reply(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> Result<String, ProviderError>;
}
