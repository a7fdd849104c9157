use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;

use quiz_core::model::{QuestionRecord, SelectionSettings, StatsState};
use quiz_core::sampler::{uniform_sample, weighted_sample};
use quiz_core::selection::{review_weight, target_new};
use storage::StatsStore;

/// Selection result for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan {
    /// Never-shown questions first, then weighted review picks.
    pub questions: Vec<QuestionRecord>,
    pub new_selected: usize,
    pub review_selected: usize,
    /// Session number the selection was recorded under.
    pub session: u64,
}

impl SelectionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Picks each session's questions and keeps the selection history.
///
/// The history is loaded once, at construction, and every selection writes it back.
/// A failed write is logged and the in-memory history stays authoritative for the
/// rest of the process.
pub struct QuizSelector {
    store: StatsStore,
    state: StatsState,
    settings: SelectionSettings,
}

impl QuizSelector {
    #[must_use]
    pub fn new(store: StatsStore) -> Self {
        let state = store.load();
        Self {
            store,
            state,
            settings: SelectionSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SelectionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn stats(&self) -> &StatsState {
        &self.state
    }

    /// Select up to `count` questions from `pool` and record them as shown.
    pub fn select_questions(
        &mut self,
        pool: &[QuestionRecord],
        count: usize,
        coverage_target: usize,
    ) -> Vec<QuestionRecord> {
        self.plan(pool, count, coverage_target).questions
    }

    /// Like [`select_questions`](Self::select_questions) but reports the split.
    pub fn plan(
        &mut self,
        pool: &[QuestionRecord],
        count: usize,
        coverage_target: usize,
    ) -> SelectionPlan {
        let mut rng = rand::rng();
        self.plan_with_rng(pool, count, coverage_target, &mut rng)
    }

    /// Build a selection using the provided rng.
    ///
    /// - at least `ceil(pool / coverage_target)` never-shown questions are drawn
    ///   uniformly, capped by `count` and by how many unseen questions exist
    /// - the rest is drawn by weight from everything not yet picked
    /// - the session counter advances even when nothing is selected
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &mut self,
        pool: &[QuestionRecord],
        count: usize,
        coverage_target: usize,
        rng: &mut R,
    ) -> SelectionPlan {
        let session = self.state.next_session();
        let candidates = distinct_by_id(pool);

        let quota = target_new(candidates.len(), count, coverage_target);
        let unseen: Vec<&QuestionRecord> = candidates
            .iter()
            .copied()
            .filter(|q| self.state.get(q.id()).is_unseen())
            .collect();
        let new_count = quota.min(unseen.len()).min(count);
        let new_picks = uniform_sample(&unseen, new_count, rng);

        let picked: HashSet<_> = new_picks.iter().map(|q| q.id()).collect();
        let remaining: Vec<&QuestionRecord> = candidates
            .iter()
            .copied()
            .filter(|q| !picked.contains(q.id()))
            .collect();
        let review_picks = weighted_sample(
            &remaining,
            count - new_count,
            |q| review_weight(&self.state.get(q.id()), session, &self.settings),
            rng,
        );

        let new_selected = new_picks.len();
        let review_selected = review_picks.len();
        let questions: Vec<QuestionRecord> = new_picks
            .into_iter()
            .chain(review_picks)
            .cloned()
            .collect();

        self.state
            .record_session(session, questions.iter().map(QuestionRecord::id));
        if let Err(e) = self.store.save(&self.state) {
            warn!("could not persist quiz stats, continuing in memory: {e}");
        }

        debug!(
            "session {session}: {new_selected} new (quota {quota}, {} unseen) + {review_selected} review from {} questions",
            unseen.len(),
            candidates.len()
        );

        SelectionPlan {
            questions,
            new_selected,
            review_selected,
            session,
        }
    }
}

fn distinct_by_id(pool: &[QuestionRecord]) -> Vec<&QuestionRecord> {
    let mut ids = HashSet::with_capacity(pool.len());
    let mut distinct = Vec::with_capacity(pool.len());
    for question in pool {
        if ids.insert(question.id()) {
            distinct.push(question);
        } else {
            warn!("ignoring duplicate question id {} in pool", question.id());
        }
    }
    distinct
}
