use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question needs at least 2 choices, got {count}")]
    TooFewChoices { count: usize },

    #[error("choice {index} has empty text")]
    EmptyChoice { index: usize },

    #[error("question has no correct choice")]
    NoCorrectChoice,
}

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// One answer option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub correct: bool,
}

impl Choice {
    #[must_use]
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// An immutable question from the bank.
///
/// Selection only ever looks at `id`; the text and choices are carried through for
/// display and grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    id: QuestionId,
    text: String,
    choices: Vec<Choice>,
}

impl QuestionRecord {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are fewer than two
    /// choices, a choice is blank, or no choice is marked correct.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                count: choices.len(),
            });
        }
        if let Some(index) = choices.iter().position(|c| c.text.trim().is_empty()) {
            return Err(QuestionError::EmptyChoice { index });
        }
        if !choices.iter().any(|c| c.correct) {
            return Err(QuestionError::NoCorrectChoice);
        }

        Ok(Self { id, text, choices })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Indices of the correct choices, ascending.
    #[must_use]
    pub fn correct_indices(&self) -> Vec<usize> {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.correct.then_some(i))
            .collect()
    }

    /// True when more than one choice is correct.
    #[must_use]
    pub fn is_multi_answer(&self) -> bool {
        self.choices.iter().filter(|c| c.correct).count() > 1
    }

    /// Returns a copy with the choice order shuffled. Display-only; the id is kept.
    #[must_use]
    pub fn with_shuffled_choices<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut choices = self.choices.clone();
        choices.shuffle(rng);
        Self {
            id: self.id.clone(),
            text: self.text.clone(),
            choices,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn choices() -> Vec<Choice> {
        vec![
            Choice::new("Paris", true),
            Choice::new("Rome", false),
            Choice::new("Madrid", false),
        ]
    }

    #[test]
    fn rejects_blank_text() {
        let err = QuestionRecord::new(QuestionId::new("1-1"), "  ", choices()).unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn rejects_single_choice() {
        let err = QuestionRecord::new(
            QuestionId::new("1-1"),
            "Capital of France?",
            vec![Choice::new("Paris", true)],
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::TooFewChoices { count: 1 });
    }

    #[test]
    fn rejects_when_nothing_correct() {
        let err = QuestionRecord::new(
            QuestionId::new("1-1"),
            "Capital of France?",
            vec![Choice::new("Rome", false), Choice::new("Madrid", false)],
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::NoCorrectChoice);
    }

    #[test]
    fn rejects_blank_choice() {
        let err = QuestionRecord::new(
            QuestionId::new("1-1"),
            "Capital of France?",
            vec![Choice::new("Paris", true), Choice::new(" ", false)],
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyChoice { index: 1 });
    }

    #[test]
    fn shuffle_keeps_id_and_choice_set() {
        let q = QuestionRecord::new(QuestionId::new("1-1"), "Capital of France?", choices())
            .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = q.with_shuffled_choices(&mut rng);

        assert_eq!(shuffled.id(), q.id());
        assert_eq!(shuffled.choices().len(), 3);
        let correct: Vec<_> = shuffled
            .correct_indices()
            .into_iter()
            .map(|i| shuffled.choices()[i].text.clone())
            .collect();
        assert_eq!(correct, vec!["Paris".to_string()]);
    }

    #[test]
    fn multi_answer_detection() {
        let single = QuestionRecord::new(QuestionId::new("a"), "Q", choices()).unwrap();
        assert!(!single.is_multi_answer());

        let multi = QuestionRecord::new(
            QuestionId::new("b"),
            "Pick primes",
            vec![
                Choice::new("2", true),
                Choice::new("3", true),
                Choice::new("4", false),
            ],
        )
        .unwrap();
        assert!(multi.is_multi_answer());
        assert_eq!(multi.correct_indices(), vec![0, 1]);
    }
}
