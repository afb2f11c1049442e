//! Renders an [`AnswerSet`] against a [`QuestionBank`] into the analysis document
//! handed to the persona synthesizer.

use super::answers::{Answer, AnswerSet};
use super::bank::QuestionBank;
use std::fmt::Write as _;

const DOCUMENT_HEADER: &str = "USER QUESTIONNAIRE ANSWERS:\n\n";

/// The compiled questionnaire, ready to be sent as the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDocument(String);

impl AnalysisDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for AnalysisDocument {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl std::fmt::Display for AnalysisDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Walks the bank in canonical order and emits one section per block. Unanswered
/// questions, including an empty selected value, are skipped without a placeholder;
/// identical inputs give identical bytes.
pub fn compile(answers: &AnswerSet, bank: &QuestionBank) -> AnalysisDocument {
    let mut out = String::from(DOCUMENT_HEADER);
    for block in bank.blocks() {
        let _ = writeln!(out, "=== {} ===", block.title);
        for question in &block.questions {
            let Some(answer) = answers.get(&question.id) else {
                continue;
            };
            let rendered = match answer {
                Answer::Selected(value) if value.is_empty() => continue,
                Answer::Custom(text) => format!("(Custom Answer): {}", text),
                Answer::Selected(value) => question
                    .option_text(value)
                    .unwrap_or(value.as_str())
                    .to_string(),
            };
            let _ = write!(out, "Q: {}\nA: {}\n\n", question.prompt, rendered);
        }
    }
    AnalysisDocument(out)
}
