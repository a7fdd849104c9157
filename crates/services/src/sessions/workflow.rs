use rand::Rng;

use quiz_core::Clock;
use quiz_core::model::{Explanations, QuestionRecord, QuizSettings};
use storage::StatsStore;

use super::plan::QuizSelector;
use super::service::QuizSession;
use crate::error::SessionError;

/// How much of the bank the learner has been shown so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub total: usize,
    pub seen: usize,
    pub unseen: usize,
    pub sessions: u64,
}

/// Orchestrates quiz start: selection, history and the fresh run.
pub struct QuizService {
    clock: Clock,
    bank: Vec<QuestionRecord>,
    selector: QuizSelector,
    explanations: Explanations,
    settings: QuizSettings,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Vec<QuestionRecord>,
        store: StatsStore,
        settings: QuizSettings,
    ) -> Self {
        let selector = QuizSelector::new(store).with_settings(settings.selection().clone());
        Self {
            clock,
            bank,
            selector,
            explanations: Explanations::default(),
            settings,
        }
    }

    #[must_use]
    pub fn with_explanations(mut self, explanations: Explanations) -> Self {
        self.explanations = explanations;
        self
    }

    #[must_use]
    pub fn explanations(&self) -> &Explanations {
        &self.explanations
    }

    /// An empty bank disables quiz start.
    #[must_use]
    pub fn can_start(&self) -> bool {
        !self.bank.is_empty()
    }

    /// Select this session's questions and start a run over them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the bank is empty.
    pub fn start_quiz(&mut self) -> Result<QuizSession, SessionError> {
        let mut rng = rand::rng();
        self.start_quiz_with_rng(&mut rng)
    }

    /// Same as [`start_quiz`](Self::start_quiz) with an explicit rng.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the bank is empty.
    pub fn start_quiz_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        if !self.can_start() {
            return Err(SessionError::Empty);
        }
        let count = usize::try_from(self.settings.question_count()).unwrap_or(usize::MAX);
        let coverage = usize::try_from(self.settings.coverage_target()).unwrap_or(usize::MAX);
        let plan = self
            .selector
            .plan_with_rng(&self.bank, count, coverage, rng);
        QuizSession::start_with_rng(plan.questions, self.clock.now(), rng)
    }

    #[must_use]
    pub fn coverage(&self) -> CoverageReport {
        let stats = self.selector.stats();
        let seen = self
            .bank
            .iter()
            .filter(|q| !stats.get(q.id()).is_unseen())
            .count();
        CoverageReport {
            total: self.bank.len(),
            seen,
            unseen: self.bank.len() - seen,
            sessions: stats.session_counter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, QuestionId, SelectionSettings};
    use quiz_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bank(n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| {
                QuestionRecord::new(
                    QuestionId::new(format!("1-{i}")),
                    format!("Question {i}"),
                    vec![Choice::new("right", true), Choice::new("wrong", false)],
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn empty_bank_cannot_start() {
        let mut service = QuizService::new(
            fixed_clock(),
            Vec::new(),
            StatsStore::in_memory(),
            QuizSettings::default(),
        );
        assert!(!service.can_start());
        assert_eq!(service.start_quiz().unwrap_err(), SessionError::Empty);
    }

    #[test]
    fn start_uses_configured_count() {
        let settings = QuizSettings::new(4, 2, SelectionSettings::default()).unwrap();
        let mut service =
            QuizService::new(fixed_clock(), bank(12), StatsStore::in_memory(), settings);
        let mut rng = StdRng::seed_from_u64(5);

        let session = service.start_quiz_with_rng(&mut rng).unwrap();
        assert_eq!(session.total(), 4);

        let coverage = service.coverage();
        assert_eq!(coverage.total, 12);
        assert_eq!(coverage.seen, 4);
        assert_eq!(coverage.unseen, 8);
        assert_eq!(coverage.sessions, 1);
    }

    #[test]
    fn whole_bank_is_eventually_covered() {
        // ceil(12 / 3) = 4 new per session, so three sessions cover everything
        let settings = QuizSettings::new(4, 3, SelectionSettings::default()).unwrap();
        let mut service =
            QuizService::new(fixed_clock(), bank(12), StatsStore::in_memory(), settings);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..3 {
            service.start_quiz_with_rng(&mut rng).unwrap();
        }
        assert_eq!(service.coverage().unseen, 0);
    }
}
