//! Intent classification.

use std::sync::Arc;

use lumen_core::error::{Error, Result};
use tracing::debug;

use crate::action::Action;
use crate::llm::LlmClient;
use crate::prompts;

/// Maps a raw utterance to an [`Action`] with one completion. No retry;
/// every completion maps to some action, so only provider failures error.
pub struct IntentClassifier {
    llm: Arc<LlmClient>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn classify(&self, user_text: &str) -> Result<Action> {
        let output = self
            .llm
            .complete(&prompts::classifier(user_text))
            .await
            .map_err(Error::Classification)?;

        let action = Action::from_classifier_output(&output);
        debug!(action = action.name(), "Classifier output mapped");
        Ok(action)
    }
}
