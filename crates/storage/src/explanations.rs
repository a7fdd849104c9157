//! Optional explanation map, keyed by question id.
//!
//! ```text
//! { "1-2": { "text": "...", "links": [ { "label": "Docs", "url": "https://..." } ] } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use quiz_core::model::{Explanation, ExplanationLink, Explanations, QuestionId};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct RawExplanation {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawLink {
    label: String,
    url: String,
}

/// Load the explanation file. Missing or unreadable files yield an empty map.
#[must_use]
pub fn load_explanations(path: &Path) -> Explanations {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let explanations = parse_explanations(&raw);
            info!("loaded {} explanations from {}", explanations.len(), path.display());
            explanations
        }
        Err(e) => {
            warn!("explanations unavailable ({}): {e}", path.display());
            Explanations::default()
        }
    }
}

/// Parse explanation JSON. Bad entries are skipped; bad links are dropped from
/// otherwise usable entries.
#[must_use]
pub fn parse_explanations(raw: &str) -> Explanations {
    let entries: HashMap<String, Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("discarding unreadable explanations: {e}");
            return Explanations::default();
        }
    };

    let mut by_id = HashMap::with_capacity(entries.len());
    for (id, value) in entries {
        let raw_entry: RawExplanation = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping explanation for {id}: {e}");
                continue;
            }
        };
        let links = raw_entry
            .links
            .into_iter()
            .filter_map(|link| match ExplanationLink::new(link.label, &link.url) {
                Ok(link) => Some(link),
                Err(e) => {
                    warn!("dropping link for {id}: {e}");
                    None
                }
            })
            .collect();
        let explanation = Explanation {
            text: raw_entry.text.filter(|t| !t.trim().is_empty()),
            links,
        };
        if !explanation.is_empty() {
            by_id.insert(QuestionId::new(id), explanation);
        }
    }
    Explanations::new(by_id)
}
