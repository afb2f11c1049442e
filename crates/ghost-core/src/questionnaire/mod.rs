//! Onboarding questionnaire: static bank, user answers, and the compiler that
//! turns both into a single analysis document.

mod answers;
mod bank;
mod compiler;

pub use answers::{Answer, AnswerSet, CUSTOM_ANSWER_PREFIX};
pub use bank::{Question, QuestionBank, QuestionBlock, QuestionOption, CUSTOM_OPTION_VALUE};
pub use compiler::{compile, AnalysisDocument};
