//! Quota and weight math used when picking a session's questions.

use crate::model::{QuestionStat, SelectionSettings};

/// Minimum number of never-shown questions to inject into one session.
///
/// `ceil(pool_len / coverage_target)` clamped to `[1, count]`, so that at steady state
/// the whole pool is covered about once every `coverage_target` sessions. A
/// `coverage_target` of zero is treated as one; a `count` of zero yields zero.
#[must_use]
pub fn target_new(pool_len: usize, count: usize, coverage_target: usize) -> usize {
    if count == 0 {
        return 0;
    }
    pool_len.div_ceil(coverage_target.max(1)).clamp(1, count)
}

/// `1 / (1 + seen)^exponent`: strictly decreasing in `seen`, never zero.
#[must_use]
pub fn count_penalty(seen: u32, exponent: f64) -> f64 {
    1.0 / (1.0 + f64::from(seen)).powf(exponent)
}

/// Penalty for questions shown within the recent window before `next_session`.
#[must_use]
pub fn recency_penalty(stat: &QuestionStat, next_session: u64, settings: &SelectionSettings) -> f64 {
    match stat.last_seen() {
        Some(last) if next_session.saturating_sub(last) <= settings.recent_window() => {
            settings.recency_penalty()
        }
        _ => 1.0,
    }
}

/// Sampling weight of a review candidate; always at least the configured floor.
#[must_use]
pub fn review_weight(stat: &QuestionStat, next_session: u64, settings: &SelectionSettings) -> f64 {
    let count = count_penalty(stat.seen(), settings.count_exponent());
    let recency = recency_penalty(stat, next_session, settings);
    settings.weight_floor() + count * recency
}
