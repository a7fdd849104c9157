use std::collections::BTreeMap;

use crate::model::ids::QuestionId;

//
// ─── PER-QUESTION STAT ─────────────────────────────────────────────────────────
//

/// Selection history of a single question.
///
/// `seen == 0` exactly when `last_seen` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionStat {
    seen: u32,
    last_seen: Option<u64>,
}

impl QuestionStat {
    /// The implicit stat of a question that was never selected.
    #[must_use]
    pub fn never_shown() -> Self {
        Self::default()
    }

    /// Rehydrate a stat from persisted values, restoring the `seen`/`last_seen` pairing.
    ///
    /// A zero count discards `last_seen`; a positive count without a session is
    /// pinned to session 0.
    #[must_use]
    pub fn from_persisted(seen: u32, last_seen: Option<u64>) -> Self {
        if seen == 0 {
            return Self::never_shown();
        }
        Self {
            seen,
            last_seen: Some(last_seen.unwrap_or(0)),
        }
    }

    #[must_use]
    pub fn seen(&self) -> u32 {
        self.seen
    }

    #[must_use]
    pub fn last_seen(&self) -> Option<u64> {
        self.last_seen
    }

    #[must_use]
    pub fn is_unseen(&self) -> bool {
        self.seen == 0
    }

    /// Returns the stat after being selected in `session`.
    #[must_use]
    pub fn shown_in(self, session: u64) -> Self {
        Self {
            seen: self.seen.saturating_add(1),
            last_seen: Some(session),
        }
    }
}

//
// ─── STATS STATE ───────────────────────────────────────────────────────────────
//

/// Persisted aggregate of the selection history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsState {
    session_counter: u64,
    stats_by_id: BTreeMap<QuestionId, QuestionStat>,
}

impl StatsState {
    /// Empty history: no sessions, no stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(session_counter: u64, stats_by_id: BTreeMap<QuestionId, QuestionStat>) -> Self {
        let stats_by_id = stats_by_id
            .into_iter()
            .filter(|(_, stat)| !stat.is_unseen())
            .collect();
        Self {
            session_counter,
            stats_by_id,
        }
    }

    #[must_use]
    pub fn session_counter(&self) -> u64 {
        self.session_counter
    }

    /// Number of the session the next selection will belong to.
    #[must_use]
    pub fn next_session(&self) -> u64 {
        self.session_counter.saturating_add(1)
    }

    /// Lookup with defaulting: absent ids are never shown.
    #[must_use]
    pub fn get(&self, id: &QuestionId) -> QuestionStat {
        self.stats_by_id.get(id).copied().unwrap_or_default()
    }

    /// Replaces the entry for `id` wholesale.
    pub fn set(&mut self, id: QuestionId, stat: QuestionStat) {
        if stat.is_unseen() {
            self.stats_by_id.remove(&id);
        } else {
            self.stats_by_id.insert(id, stat);
        }
    }

    /// Marks every id as shown in `session` and moves the counter to it.
    pub fn record_session<'a>(&mut self, session: u64, ids: impl IntoIterator<Item = &'a QuestionId>) {
        for id in ids {
            let stat = self.get(id).shown_in(session);
            self.set(id.clone(), stat);
        }
        self.session_counter = session;
    }

    /// Iterates over questions that have been shown at least once.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &QuestionStat)> {
        self.stats_by_id.iter()
    }

    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.stats_by_id.len()
    }
}
