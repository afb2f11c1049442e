//! User answers keyed by question id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw-form prefix marking a free-text answer (`custom:<text>`).
pub const CUSTOM_ANSWER_PREFIX: &str = "custom:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A selected option value.
    Selected(String),
    /// Free text typed by the user.
    Custom(String),
}

impl Answer {
    /// Parses the raw wire form.
    pub fn from_raw(raw: &str) -> Self {
        match raw.strip_prefix(CUSTOM_ANSWER_PREFIX) {
            Some(text) => Self::Custom(text.to_string()),
            None => Self::Selected(raw.to_string()),
        }
    }

    pub fn to_raw(&self) -> String {
        match self {
            Self::Selected(v) => v.clone(),
            Self::Custom(t) => format!("{}{}", CUSTOM_ANSWER_PREFIX, t),
        }
    }
}

/// Answers keyed by question id. Unanswered questions are simply absent.
///
/// Serializes as the flat `{ question_id: raw_answer }` map the onboarding form posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct AnswerSet {
    answers: BTreeMap<String, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw<I, K, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let answers = raw
            .into_iter()
            .map(|(k, v)| (k.into(), Answer::from_raw(v.as_ref())))
            .collect();
        Self { answers }
    }

    pub fn insert(&mut self, question_id: impl Into<String>, answer: Answer) -> Option<Answer> {
        self.answers.insert(question_id.into(), answer)
    }

    pub fn insert_selected(&mut self, question_id: impl Into<String>, value: impl Into<String>) {
        self.insert(question_id, Answer::Selected(value.into()));
    }

    pub fn insert_custom(&mut self, question_id: impl Into<String>, text: impl Into<String>) {
        self.insert(question_id, Answer::Custom(text.into()));
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<BTreeMap<String, String>> for AnswerSet {
    fn from(raw: BTreeMap<String, String>) -> Self {
        Self::from_raw(raw)
    }
}

impl From<AnswerSet> for BTreeMap<String, String> {
    fn from(set: AnswerSet) -> Self {
        set.answers
            .into_iter()
            .map(|(k, a)| (k, a.to_raw()))
            .collect()
    }
}
