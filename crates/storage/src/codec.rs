//! Persisted layout of the selection history.
//!
//! ```text
//! { "sessionCounter": 4, "statsById": { "1-3": { "seen": 2, "lastSeen": 4 } } }
//! ```
//!
//! Decoding is deliberately lenient: every field is coerced on its own and a bad
//! field never discards the rest of the record.
//!
//! Only questions that were shown are written, so every written `lastSeen` is a real
//! session. Older records may carry never-shown entries with a negative `lastSeen`
//! (`-1000000000`); any negative value reads as never shown.

use std::collections::BTreeMap;

use log::warn;
use quiz_core::model::{QuestionId, QuestionStat, StatsState};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::repository::StorageError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStats<'a> {
    session_counter: u64,
    stats_by_id: BTreeMap<&'a str, PersistedStat>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStat {
    seen: u32,
    last_seen: u64,
}

/// Serialize `state` into the persisted layout.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if JSON encoding fails.
pub fn encode_stats_state(state: &StatsState) -> Result<String, StorageError> {
    let stats_by_id = state
        .iter()
        .filter_map(|(id, stat)| {
            let last_seen = stat.last_seen()?;
            Some((
                id.as_str(),
                PersistedStat {
                    seen: stat.seen(),
                    last_seen,
                },
            ))
        })
        .collect();
    let persisted = PersistedStats {
        session_counter: state.session_counter(),
        stats_by_id,
    };
    serde_json::to_string(&persisted).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a persisted record, coercing malformed fields to their defaults.
///
/// Never fails: unparseable input yields the empty state.
#[must_use]
pub fn parse_stats_state(raw: &str) -> StatsState {
    if raw.trim().is_empty() {
        return StatsState::new();
    }
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("discarding unreadable quiz stats: {e}");
            return StatsState::new();
        }
    };
    let Some(obj) = value.as_object() else {
        warn!("discarding quiz stats: expected an object");
        return StatsState::new();
    };

    let session_counter = obj
        .get("sessionCounter")
        .and_then(coerce_count)
        .unwrap_or(0);
    let stats_by_id = obj
        .get("statsById")
        .and_then(Value::as_object)
        .map(parse_entries)
        .unwrap_or_default();

    StatsState::from_parts(session_counter, stats_by_id)
}

fn parse_entries(entries: &Map<String, Value>) -> BTreeMap<QuestionId, QuestionStat> {
    let mut stats = BTreeMap::new();
    for (id, entry) in entries {
        if id.trim().is_empty() {
            continue;
        }
        let Some(entry) = entry.as_object() else {
            continue;
        };
        let seen = entry
            .get("seen")
            .and_then(coerce_count)
            .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
        // negative sessions, the sentinel included, read as never shown
        let last_seen = entry.get("lastSeen").and_then(coerce_count);
        stats.insert(
            QuestionId::new(id.clone()),
            QuestionStat::from_persisted(seen, last_seen),
        );
    }
    stats
}

/// Non-negative integer; non-negative finite floats truncate.
fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}
