//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by quiz sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for quiz")]
    Empty,
    #[error("question {index} is out of range")]
    QuestionOutOfRange { index: usize },
    #[error("choice {choice} is out of range for question {index}")]
    ChoiceOutOfRange { index: usize, choice: usize },
    #[error("question {index} is already graded")]
    AlreadyGraded { index: usize },
    #[error("question {index} has no selected answer")]
    NothingSelected { index: usize },
    #[error("question {index} has not been graded")]
    NotGraded { index: usize },
}
