use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExplanationError {
    #[error("link label cannot be empty")]
    EmptyLabel,

    #[error("invalid link url {raw}: {reason}")]
    InvalidUrl { raw: String, reason: String },
}

/// A reference link shown next to an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationLink {
    label: String,
    url: Url,
}

impl ExplanationLink {
    /// # Errors
    ///
    /// Returns `ExplanationError` if the label is blank or the url does not parse.
    pub fn new(label: impl Into<String>, url: &str) -> Result<Self, ExplanationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ExplanationError::EmptyLabel);
        }
        let url = Url::parse(url.trim()).map_err(|e| ExplanationError::InvalidUrl {
            raw: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { label, url })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Supplementary text for a question, consulted after grading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Explanation {
    pub text: Option<String>,
    pub links: Vec<ExplanationLink>,
}

impl Explanation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty()) && self.links.is_empty()
    }
}

/// Read-only lookup from question id to explanation.
#[derive(Debug, Clone, Default)]
pub struct Explanations {
    by_id: HashMap<QuestionId, Explanation>,
}

impl Explanations {
    #[must_use]
    pub fn new(by_id: HashMap<QuestionId, Explanation>) -> Self {
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Explanation> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_requires_valid_url() {
        assert!(ExplanationLink::new("Docs", "https://example.com/a").is_ok());
        let err = ExplanationLink::new("Docs", "not a url").unwrap_err();
        assert!(matches!(err, ExplanationError::InvalidUrl { .. }));
        assert_eq!(
            ExplanationLink::new(" ", "https://example.com").unwrap_err(),
            ExplanationError::EmptyLabel
        );
    }

    #[test]
    fn missing_entry_is_none() {
        let mut map = HashMap::new();
        map.insert(
            QuestionId::new("1-1"),
            Explanation {
                text: Some("Because.".into()),
                links: Vec::new(),
            },
        );
        let explanations = Explanations::new(map);
        assert!(explanations.get(&QuestionId::new("1-1")).is_some());
        assert!(explanations.get(&QuestionId::new("9-9")).is_none());
    }
}
