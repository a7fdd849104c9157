use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;

use quiz_core::model::{Explanation, Explanations, QuestionRecord};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PER-QUESTION STATE ────────────────────────────────────────────────────────
//

/// Learner input and grading state for one question of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    /// Display indices of the chosen answers.
    pub selected: BTreeSet<usize>,
    pub graded: bool,
    pub explained: bool,
    pub is_correct: bool,
}

/// Outcome of grading a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub index: usize,
    pub is_correct: bool,
    /// Display indices of the correct answers.
    pub correct_choices: Vec<usize>,
    pub is_complete: bool,
}

/// Final tally of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub total: usize,
    pub correct: usize,
    pub score_percent: f64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a selected question set. Not persisted.
///
/// Choice order is shuffled per question when the run starts; all answer indices
/// refer to that display order.
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    answers: Vec<AnswerState>,
    correct_count: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a run over `questions` in the given order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn start(
        questions: Vec<QuestionRecord>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let mut rng = rand::rng();
        Self::start_with_rng(questions, started_at, &mut rng)
    }

    /// Same as [`start`](Self::start) with an explicit rng for the choice shuffle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn start_with_rng<R: Rng + ?Sized>(
        questions: Vec<QuestionRecord>,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let questions: Vec<QuestionRecord> = questions
            .iter()
            .map(|q| q.with_shuffled_choices(rng))
            .collect();
        let answers = vec![AnswerState::default(); questions.len()];

        Ok(Self {
            questions,
            answers,
            correct_count: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    /// # Errors
    ///
    /// Returns `SessionError::QuestionOutOfRange` for an unknown index.
    pub fn question(&self, index: usize) -> Result<&QuestionRecord, SessionError> {
        self.questions
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange { index })
    }

    /// # Errors
    ///
    /// Returns `SessionError::QuestionOutOfRange` for an unknown index.
    pub fn answer(&self, index: usize) -> Result<&AnswerState, SessionError> {
        self.answers
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange { index })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn graded_count(&self) -> usize {
        self.answers.iter().filter(|a| a.graded).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Select or deselect a choice.
    ///
    /// Questions with a single correct answer behave like radio buttons: picking a
    /// choice replaces the previous one. Multi-answer questions toggle membership.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for unknown indices or an already graded question.
    pub fn toggle_answer(
        &mut self,
        index: usize,
        choice: usize,
    ) -> Result<&AnswerState, SessionError> {
        let question = self.question(index)?;
        if choice >= question.choices().len() {
            return Err(SessionError::ChoiceOutOfRange { index, choice });
        }
        let multi = question.is_multi_answer();

        let answer = &mut self.answers[index];
        if answer.graded {
            return Err(SessionError::AlreadyGraded { index });
        }
        if multi {
            if !answer.selected.remove(&choice) {
                answer.selected.insert(choice);
            }
        } else if answer.selected.contains(&choice) {
            answer.selected.clear();
        } else {
            answer.selected.clear();
            answer.selected.insert(choice);
        }
        Ok(answer)
    }

    /// Grade a question: correct iff the selection equals the set of correct choices.
    ///
    /// The run completes once every question is graded; `graded_at` is recorded as
    /// the completion time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for unknown indices, a repeated grade, or an empty
    /// selection.
    pub fn grade(
        &mut self,
        index: usize,
        graded_at: DateTime<Utc>,
    ) -> Result<GradeOutcome, SessionError> {
        let correct_choices = self.question(index)?.correct_indices();

        let answer = &mut self.answers[index];
        if answer.graded {
            return Err(SessionError::AlreadyGraded { index });
        }
        if answer.selected.is_empty() {
            return Err(SessionError::NothingSelected { index });
        }

        let is_correct = answer.selected.iter().copied().eq(correct_choices.iter().copied());
        answer.graded = true;
        answer.is_correct = is_correct;
        if is_correct {
            self.correct_count += 1;
        }

        if self.answers.iter().all(|a| a.graded) {
            self.completed_at = Some(graded_at);
        }

        Ok(GradeOutcome {
            index,
            is_correct,
            correct_choices,
            is_complete: self.is_complete(),
        })
    }

    /// Look up the explanation for a graded question and mark it as explained.
    ///
    /// A question without an entry yields `Ok(None)` and is still marked.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for unknown indices or an ungraded question.
    pub fn explain<'e>(
        &mut self,
        index: usize,
        explanations: &'e Explanations,
    ) -> Result<Option<&'e Explanation>, SessionError> {
        let id = self.question(index)?.id().clone();
        let answer = &mut self.answers[index];
        if !answer.graded {
            return Err(SessionError::NotGraded { index });
        }
        answer.explained = true;
        Ok(explanations.get(&id))
    }

    /// Drop every selected choice of an ungraded question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for unknown indices or an already graded question.
    pub fn clear_answer(&mut self, index: usize) -> Result<(), SessionError> {
        self.question(index)?;
        let answer = &mut self.answers[index];
        if answer.graded {
            return Err(SessionError::AlreadyGraded { index });
        }
        answer.selected.clear();
        Ok(())
    }

    /// Returns a summary of the current run progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let graded = self.graded_count();
        SessionProgress {
            total: self.total(),
            graded,
            remaining: self.total().saturating_sub(graded),
            correct: self.correct_count,
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> QuizSummary {
        let total = self.total();
        #[allow(clippy::cast_precision_loss)]
        let score_percent = if total == 0 {
            0.0
        } else {
            100.0 * self.correct_count as f64 / total as f64
        };
        QuizSummary {
            total,
            correct: self.correct_count,
            score_percent,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("graded", &self.graded_count())
            .field("correct_count", &self.correct_count)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, QuestionId};
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn single(id: &str) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(id),
            "Capital of France?",
            vec![
                Choice::new("Paris", true),
                Choice::new("Rome", false),
                Choice::new("Madrid", false),
            ],
        )
        .unwrap()
    }

    fn multi(id: &str) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(id),
            "Pick the primes",
            vec![
                Choice::new("2", true),
                Choice::new("3", true),
                Choice::new("4", false),
            ],
        )
        .unwrap()
    }

    fn start(questions: Vec<QuestionRecord>) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(11);
        QuizSession::start_with_rng(questions, fixed_now(), &mut rng).unwrap()
    }

    fn correct_of(session: &QuizSession, index: usize) -> Vec<usize> {
        session.question(index).unwrap().correct_indices()
    }

    fn wrong_of(session: &QuizSession, index: usize) -> usize {
        let correct = correct_of(session, index);
        (0..session.question(index).unwrap().choices().len())
            .find(|i| !correct.contains(i))
            .unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::start(Vec::new(), fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn single_answer_questions_behave_like_radio_buttons() {
        let mut session = start(vec![single("a")]);
        session.toggle_answer(0, 0).unwrap();
        let state = session.toggle_answer(0, 2).unwrap();
        assert_eq!(state.selected.iter().copied().collect::<Vec<_>>(), vec![2]);

        let state = session.toggle_answer(0, 2).unwrap();
        assert!(state.selected.is_empty());
    }

    #[test]
    fn multi_answer_questions_toggle() {
        let mut session = start(vec![multi("m")]);
        session.toggle_answer(0, 0).unwrap();
        session.toggle_answer(0, 1).unwrap();
        assert_eq!(session.answer(0).unwrap().selected.len(), 2);
        session.toggle_answer(0, 0).unwrap();
        assert_eq!(session.answer(0).unwrap().selected.len(), 1);
    }

    #[test]
    fn grading_counts_correct_answers_and_completes() {
        let mut session = start(vec![single("a"), multi("m")]);

        let right = correct_of(&session, 0)[0];
        session.toggle_answer(0, right).unwrap();
        let first = session.grade(0, fixed_now()).unwrap();
        assert!(first.is_correct);
        assert!(!first.is_complete);

        // only one of the two primes: partially right is wrong
        let partial = correct_of(&session, 1)[0];
        session.toggle_answer(1, partial).unwrap();
        let second = session.grade(1, fixed_now()).unwrap();
        assert!(!second.is_correct);
        assert_eq!(second.correct_choices.len(), 2);
        assert!(second.is_complete);

        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.completed_at(), Some(fixed_now()));
        let summary = session.summary();
        assert_eq!(summary.total, 2);
        assert!((summary.score_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn graded_questions_are_locked() {
        let mut session = start(vec![single("a")]);
        let wrong = wrong_of(&session, 0);
        session.toggle_answer(0, wrong).unwrap();
        let outcome = session.grade(0, fixed_now()).unwrap();
        assert!(!outcome.is_correct);

        assert_eq!(
            session.toggle_answer(0, 0).unwrap_err(),
            SessionError::AlreadyGraded { index: 0 }
        );
        assert_eq!(
            session.grade(0, fixed_now()).unwrap_err(),
            SessionError::AlreadyGraded { index: 0 }
        );
        assert_eq!(session.correct_count(), 0);
    }

    #[test]
    fn grading_requires_a_selection() {
        let mut session = start(vec![single("a")]);
        assert_eq!(
            session.grade(0, fixed_now()).unwrap_err(),
            SessionError::NothingSelected { index: 0 }
        );
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut session = start(vec![single("a")]);
        assert_eq!(
            session.toggle_answer(3, 0).unwrap_err(),
            SessionError::QuestionOutOfRange { index: 3 }
        );
        assert_eq!(
            session.toggle_answer(0, 9).unwrap_err(),
            SessionError::ChoiceOutOfRange { index: 0, choice: 9 }
        );
    }

    #[test]
    fn explanations_only_after_grading() {
        let mut map = HashMap::new();
        map.insert(
            QuestionId::new("a"),
            Explanation {
                text: Some("Paris has been the capital since 987.".into()),
                links: Vec::new(),
            },
        );
        let explanations = Explanations::new(map);
        let mut session = start(vec![single("a"), single("b")]);

        assert_eq!(
            session.explain(0, &explanations).unwrap_err(),
            SessionError::NotGraded { index: 0 }
        );

        for index in 0..2 {
            let right = correct_of(&session, index)[0];
            session.toggle_answer(index, right).unwrap();
            session.grade(index, fixed_now()).unwrap();
        }

        assert!(session.explain(0, &explanations).unwrap().is_some());
        assert!(session.answer(0).unwrap().explained);
        assert!(session.explain(1, &explanations).unwrap().is_none());
        assert!(session.answer(1).unwrap().explained);
    }

    #[test]
    fn explaining_without_an_entry_still_marks_explained() {
        let mut session = start(vec![single("a")]);
        let right = correct_of(&session, 0)[0];
        session.toggle_answer(0, right).unwrap();
        session.grade(0, fixed_now()).unwrap();

        let explanations = Explanations::default();
        let explanation = session.explain(0, &explanations).unwrap();
        assert!(explanation.is_none());
        assert!(session.answer(0).unwrap().explained);
    }

    #[test]
    fn clearing_drops_selection_until_graded() {
        let mut session = start(vec![multi("m")]);
        session.toggle_answer(0, 0).unwrap();
        session.toggle_answer(0, 2).unwrap();
        session.clear_answer(0).unwrap();
        assert!(session.answer(0).unwrap().selected.is_empty());

        let right = correct_of(&session, 0);
        for choice in &right {
            session.toggle_answer(0, *choice).unwrap();
        }
        session.grade(0, fixed_now()).unwrap();
        assert_eq!(
            session.clear_answer(0).unwrap_err(),
            SessionError::AlreadyGraded { index: 0 }
        );
        assert_eq!(
            session.clear_answer(4).unwrap_err(),
            SessionError::QuestionOutOfRange { index: 4 }
        );
    }

    #[test]
    fn progress_tracks_grading() {
        let mut session = start(vec![single("a"), single("b"), single("c")]);
        let right = correct_of(&session, 1)[0];
        session.toggle_answer(1, right).unwrap();
        session.grade(1, fixed_now()).unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.graded, 1);
        assert_eq!(progress.remaining, 2);
        assert_eq!(progress.correct, 1);
        assert!(!progress.is_complete);
    }
}
