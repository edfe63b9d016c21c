//! The fixed action taxonomy a turn is routed to.

/// What a single turn does. Exactly one per turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Numeric problem, answered directly from the raw prompt
    Solve,
    /// Chapter question answered from retrieved passages plus a page image
    Retrieve,
    /// Mindmap image for a topic
    Mindmap,
    /// One multiple-choice question as JSON
    Quiz,
    /// Two harder variants of a previous question
    Similar,
    /// Small talk; carries the classifier's own reply
    Chat(String),
}

impl Action {
    /// Map a classifier completion onto an action.
    ///
    /// Only the digits 0-4 (surrounding whitespace ignored) select a
    /// strategy; anything else is the model answering as an assistant and
    /// becomes `Chat` with the reply untouched.
    pub fn from_classifier_output(raw: &str) -> Self {
        match raw.trim() {
            "0" => Action::Solve,
            "1" => Action::Retrieve,
            "2" => Action::Mindmap,
            "3" => Action::Quiz,
            "4" => Action::Similar,
            _ => Action::Chat(raw.to_string()),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Solve => "solve",
            Action::Retrieve => "retrieve",
            Action::Mindmap => "mindmap",
            Action::Quiz => "quiz",
            Action::Similar => "similar",
            Action::Chat(_) => "chat",
        }
    }

    /// Whether the turn rewrites the prompt into a standalone question first.
    pub fn needs_condense(&self) -> bool {
        matches!(
            self,
            Action::Retrieve | Action::Mindmap | Action::Quiz | Action::Similar
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
