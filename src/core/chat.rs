//! Chat engine: one user turn from input to recorded reply
//!
//! For each message the ChatEngine:
//! 1. Checks the session is logged in and the message is not blank
//! 2. Labels the message (English, Urdu, Roman Urdu)
//! 3. Picks the system instruction for that label
//! 4. Fetches a single complete reply from the provider
//! 5. Appends the user message and the reply to the session's history
//!
//! A failed fetch records nothing, so history is exactly what it was
//! before the turn started.

use std::sync::Arc;

use serde::Serialize;

use crate::config::PromptSet;
use crate::language::{HeuristicClassifier, Label, LanguageClassifier};
use crate::providers::{ProviderError, ReplyFetcher};
use crate::session::SessionState;

/// Outcome of a successful turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub label: Label,
    pub reply: String,
}

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Please log in first")]
    NotLoggedIn,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Could not get a reply: {0}")]
    Upstream(#[from] ProviderError),
}

/// The core chat engine
pub struct ChatEngine {
    classifier: Box<dyn LanguageClassifier>,
    prompts: PromptSet,
    fetcher: Arc<dyn ReplyFetcher>,
}

impl ChatEngine {
    /// Create a chat engine with the heuristic classifier and the given prompts
    pub fn new(prompts: PromptSet, fetcher: Arc<dyn ReplyFetcher>) -> Self {
        Self {
            classifier: Box::new(HeuristicClassifier),
            prompts,
            fetcher,
        }
    }

    /// Swap in a different classifier
    pub fn with_classifier(mut self, classifier: impl LanguageClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Run one turn against `session`.
    pub async fn submit(&self, session: &mut SessionState, input: &str) -> Result<Turn, ChatError> {
        if !session.is_logged_in() {
            return Err(ChatError::NotLoggedIn);
        }
        if input.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let label = self.classifier.classify(input);
        let instruction = self.prompts.select(label);

        tracing::debug!(
            %label,
            input_len = input.len(),
            history_len = session.conversation().len(),
            "fetching reply"
        );

        let reply = match self.fetcher.fetch_reply(instruction, input).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(%label, error = %e, "reply fetch failed; turn not recorded");
                return Err(e.into());
            }
        };

        session.conversation_mut().push_turn(input, &reply);
        tracing::debug!(%label, reply_len = reply.len(), "turn recorded");

        Ok(Turn { label, reply })
    }
}
