//! Follow-up question condensing.

use std::sync::Arc;

use lumen_core::error::{Error, Result};
use lumen_core::message::ConversationHistory;

use crate::llm::LlmClient;
use crate::prompts;

/// Rewrites the latest utterance into a standalone question using the
/// conversation so far. Does not touch the history; the router records the
/// condensed question.
pub struct QueryCondenser {
    llm: Arc<LlmClient>,
}

impl QueryCondenser {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Returns the completion verbatim.
    pub async fn condense(&self, history: &ConversationHistory, question: &str) -> Result<String> {
        let prompt = prompts::condense(&history.to_transcript(), question);
        self.llm.complete(&prompt).await.map_err(Error::Condense)
    }
}
