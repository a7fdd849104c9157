use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a question across the whole bank and across sessions.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId` from an already-stable key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier from the bank's composite key.
    ///
    /// Uses `"{set}-{number}"` when both parts are present and non-blank, otherwise
    /// falls back to the positional key `"row-{position}"`.
    #[must_use]
    pub fn from_parts(set: Option<&str>, number: Option<&str>, position: usize) -> Self {
        let set = set.map(str::trim).filter(|s| !s.is_empty());
        let number = number.map(str::trim).filter(|s| !s.is_empty());
        match (set, number) {
            (Some(set), Some(number)) => Self(format!("{set}-{number}")),
            _ => Self(format!("row-{position}")),
        }
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "QuestionId".to_string(),
            });
        }
        Ok(Self::new(trimmed))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_joins_set_and_number() {
        let id = QuestionId::from_parts(Some("3"), Some("12"), 7);
        assert_eq!(id.as_str(), "3-12");
    }

    #[test]
    fn missing_part_falls_back_to_position() {
        assert_eq!(QuestionId::from_parts(None, Some("12"), 7).as_str(), "row-7");
        assert_eq!(QuestionId::from_parts(Some(" "), Some("12"), 8).as_str(), "row-8");
        assert_eq!(QuestionId::from_parts(Some("2"), None, 9).as_str(), "row-9");
    }

    #[test]
    fn question_id_from_str_rejects_blank() {
        assert!("   ".parse::<QuestionId>().is_err());
        let id: QuestionId = " 1-4 ".parse().unwrap();
        assert_eq!(id, QuestionId::new("1-4"));
    }

    #[test]
    fn question_id_display() {
        assert_eq!(QuestionId::new("7-1").to_string(), "7-1");
    }
}
