//! Static question bank: ordered blocks of multiple-choice questions.

use super::answers::{Answer, AnswerSet};
use crate::error::{GhostError, GhostResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Option value reserved for the free-text answer.
pub const CUSTOM_OPTION_VALUE: &str = "custom";

static BUNDLED_BANK: Lazy<QuestionBank> = Lazy::new(|| {
    QuestionBank::from_json(include_str!("../../data/question_bank.json"))
        .expect("bundled question bank is malformed")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "q")]
    pub prompt: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Display text for a stored option value, if any option carries it.
    pub fn option_text(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.text.as_str())
    }

    pub fn accepts_custom(&self) -> bool {
        self.options.iter().any(|o| o.value == CUSTOM_OPTION_VALUE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

/// Ordered, read-only sequence of question blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    blocks: Vec<QuestionBlock>,
}

impl QuestionBank {
    /// The bank shipped with the crate.
    pub fn bundled() -> &'static QuestionBank {
        &BUNDLED_BANK
    }

    /// Parses a bank from its JSON form (an array of blocks) and checks its shape.
    pub fn from_json(raw: &str) -> GhostResult<Self> {
        let blocks: Vec<QuestionBlock> = serde_json::from_str(raw)
            .map_err(|e| GhostError::Validation(format!("question bank: {}", e)))?;
        Self::new(blocks)
    }

    pub fn new(blocks: Vec<QuestionBlock>) -> GhostResult<Self> {
        if blocks.is_empty() {
            return Err(GhostError::Validation("question bank has no blocks".into()));
        }
        let mut seen = HashSet::new();
        for block in &blocks {
            for q in &block.questions {
                if !seen.insert(q.id.as_str()) {
                    return Err(GhostError::Validation(format!(
                        "question bank: duplicate question id '{}'",
                        q.id
                    )));
                }
                if q.options.is_empty() {
                    return Err(GhostError::Validation(format!(
                        "question bank: question '{}' has no options",
                        q.id
                    )));
                }
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[QuestionBlock] {
        &self.blocks
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.blocks
            .iter()
            .flat_map(|b| b.questions.iter())
            .find(|q| q.id == id)
    }

    /// Question ids in `block_index` with no usable answer. A custom answer with no
    /// text at all counts as unanswered; whitespace is accepted as written. Out-of-range
    /// blocks yield an empty list.
    pub fn unanswered<'a>(&'a self, block_index: usize, answers: &AnswerSet) -> Vec<&'a str> {
        let Some(block) = self.blocks.get(block_index) else {
            return Vec::new();
        };
        block
            .questions
            .iter()
            .filter(|q| match answers.get(&q.id) {
                None => true,
                Some(Answer::Custom(text)) => text.is_empty(),
                Some(Answer::Selected(value)) => value.is_empty(),
            })
            .map(|q| q.id.as_str())
            .collect()
    }

    pub fn is_block_complete(&self, block_index: usize, answers: &AnswerSet) -> bool {
        block_index < self.blocks.len() && self.unanswered(block_index, answers).is_empty()
    }
}
