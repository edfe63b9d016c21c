//! Turn orchestration: classify, condense when needed, dispatch.

use std::time::Instant;

use async_trait::async_trait;
use lumen_core::error::Result;
use lumen_core::message::{ConversationHistory, ConversationTurn};
use tracing::{info, warn};

use crate::action::Action;
use crate::classifier::IntentClassifier;
use crate::condenser::QueryCondenser;
use crate::handlers::ActionHandlers;

/// Anything that can answer a turn. The HTTP gateway and the CLI chat
/// depend on this rather than on [`TurnRouter`] directly.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn handle_turn(&self, prompt: &str, history: &mut ConversationHistory)
    -> Result<String>;
}

/// Handles one user turn end to end. Built once at startup and shared;
/// per-session state lives only in the history passed to each call.
pub struct TurnRouter {
    classifier: IntentClassifier,
    condenser: QueryCondenser,
    handlers: ActionHandlers,
}

impl TurnRouter {
    pub fn new(
        classifier: IntentClassifier,
        condenser: QueryCondenser,
        handlers: ActionHandlers,
    ) -> Self {
        Self {
            classifier,
            condenser,
            handlers,
        }
    }

    pub fn handlers(&self) -> &ActionHandlers {
        &self.handlers
    }

    /// Run one turn and return the response text.
    ///
    /// Condensing actions append the standalone question to `history` as a
    /// user turn before their handler runs. Any failure fails the turn.
    pub async fn handle_turn(
        &self,
        prompt: &str,
        history: &mut ConversationHistory,
    ) -> Result<String> {
        let started = Instant::now();
        let action = self.classifier.classify(prompt).await?;
        info!(action = action.name(), history = history.len(), "Turn classified");

        let result = self.dispatch(&action, prompt, history).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => info!(
                action = action.name(),
                elapsed_ms,
                response_len = response.len(),
                "Turn complete"
            ),
            Err(e) => warn!(
                action = action.name(),
                stage = e.stage(),
                elapsed_ms,
                error = %e,
                "Turn failed"
            ),
        }
        result
    }

    async fn dispatch(
        &self,
        action: &Action,
        prompt: &str,
        history: &mut ConversationHistory,
    ) -> Result<String> {
        match action {
            Action::Solve => self.handlers.solve(prompt).await,
            Action::Chat(reply) => Ok(reply.clone()),
            Action::Retrieve => {
                let question = self.condensed(prompt, history).await?;
                self.handlers.retrieve(&question).await
            }
            Action::Mindmap => {
                let question = self.condensed(prompt, history).await?;
                self.handlers.mindmap(&question).await
            }
            Action::Quiz => {
                let question = self.condensed(prompt, history).await?;
                self.handlers.quiz(&question).await
            }
            Action::Similar => {
                let question = self.condensed(prompt, history).await?;
                self.handlers.similar(&question).await
            }
        }
    }

    async fn condensed(&self, prompt: &str, history: &mut ConversationHistory) -> Result<String> {
        let question = self.condenser.condense(history, prompt).await?;
        history.push(ConversationTurn::user(question.clone()));
        Ok(question)
    }
}

#[async_trait]
impl TurnHandler for TurnRouter {
    async fn handle_turn(
        &self,
        prompt: &str,
        history: &mut ConversationHistory,
    ) -> Result<String> {
        TurnRouter::handle_turn(self, prompt, history).await
    }
}
