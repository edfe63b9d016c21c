//! Multiple-choice quiz items.

use lumen_core::error::{Error, OutputKind, Result};
use serde::{Deserialize, Serialize};

use crate::markup::strip_code_fence;

/// Number of choices every quiz item must carry.
pub const CHOICE_COUNT: usize = 4;

/// One generated MCQ. Only constructed through [`QuizItem::parse`], so a
/// value in hand always has four choices and an answer among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuizItem {
    pub question: String,
    pub choices: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

impl QuizItem {
    /// Parse and validate raw model output.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        if !body.starts_with('{') {
            return Err(malformed("output is not a JSON object"));
        }

        let mut item: QuizItem =
            serde_json::from_str(body).map_err(|e| malformed(&e.to_string()))?;
        let answer = item.validate().map_err(|reason| malformed(&reason))?;
        // The stored answer is always an exact element of `choices`.
        item.answer = item.choices[answer].clone();
        Ok(item)
    }

    /// Returns the index of the choice the answer names.
    fn validate(&self) -> std::result::Result<usize, String> {
        if self.question.trim().is_empty() {
            return Err("question is empty".into());
        }
        if self.choices.len() != CHOICE_COUNT {
            return Err(format!(
                "expected {CHOICE_COUNT} choices, got {}",
                self.choices.len()
            ));
        }
        let answer = self.answer.trim();
        self.choices
            .iter()
            .position(|c| c.trim() == answer)
            .ok_or_else(|| format!("answer {:?} is not one of the choices", self.answer))
    }

    /// Position of the answer within `choices`.
    pub fn answer_index(&self) -> Option<usize> {
        self.choices.iter().position(|c| *c == self.answer)
    }

    /// Compact JSON, the wire form returned to callers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn malformed(reason: &str) -> Error {
    Error::MalformedOutput {
        kind: OutputKind::Quiz,
        reason: reason.to_string(),
    }
}
