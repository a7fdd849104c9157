use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("coverage target must be > 0")]
    InvalidCoverageTarget,

    #[error("recency penalty must be in (0, 1], got {provided}")]
    InvalidRecencyPenalty { provided: f64 },

    #[error("count exponent must be finite and >= 0, got {provided}")]
    InvalidCountExponent { provided: f64 },

    #[error("weight floor must be finite and > 0, got {provided}")]
    InvalidWeightFloor { provided: f64 },
}

//
// ─── SELECTION SETTINGS ────────────────────────────────────────────────────────
//

/// Tuning constants of the review weighting.
///
/// These are empirical choices, not derived bounds, so they are configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSettings {
    recent_window: u64,
    recency_penalty: f64,
    count_exponent: f64,
    weight_floor: f64,
}

impl Default for SelectionSettings {
    /// - items shown within the last 3 sessions are quartered in likelihood
    /// - count penalty `1 / (1 + seen)^1.15`
    /// - additive floor `0.0001`
    fn default() -> Self {
        Self {
            recent_window: 3,
            recency_penalty: 0.25,
            count_exponent: 1.15,
            weight_floor: 0.0001,
        }
    }
}

impl SelectionSettings {
    /// Creates custom selection settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the penalty is outside `(0, 1]`, the exponent is
    /// negative or not finite, or the floor is not strictly positive.
    pub fn new(
        recent_window: u64,
        recency_penalty: f64,
        count_exponent: f64,
        weight_floor: f64,
    ) -> Result<Self, SettingsError> {
        if !recency_penalty.is_finite() || recency_penalty <= 0.0 || recency_penalty > 1.0 {
            return Err(SettingsError::InvalidRecencyPenalty {
                provided: recency_penalty,
            });
        }
        if !count_exponent.is_finite() || count_exponent < 0.0 {
            return Err(SettingsError::InvalidCountExponent {
                provided: count_exponent,
            });
        }
        if !weight_floor.is_finite() || weight_floor <= 0.0 {
            return Err(SettingsError::InvalidWeightFloor {
                provided: weight_floor,
            });
        }

        Ok(Self {
            recent_window,
            recency_penalty,
            count_exponent,
            weight_floor,
        })
    }

    #[must_use]
    pub fn recent_window(&self) -> u64 {
        self.recent_window
    }

    #[must_use]
    pub fn recency_penalty(&self) -> f64 {
        self.recency_penalty
    }

    #[must_use]
    pub fn count_exponent(&self) -> f64 {
        self.count_exponent
    }

    #[must_use]
    pub fn weight_floor(&self) -> f64 {
        self.weight_floor
    }
}

//
// ─── QUIZ SETTINGS ─────────────────────────────────────────────────────────────
//

/// Per-learner quiz configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSettings {
    question_count: u32,
    coverage_target: u32,
    selection: SelectionSettings,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: 10,
            coverage_target: 20,
            selection: SelectionSettings::default(),
        }
    }
}

impl QuizSettings {
    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns error if either count is zero.
    pub fn new(
        question_count: u32,
        coverage_target: u32,
        selection: SelectionSettings,
    ) -> Result<Self, SettingsError> {
        if question_count == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        if coverage_target == 0 {
            return Err(SettingsError::InvalidCoverageTarget);
        }
        Ok(Self {
            question_count,
            coverage_target,
            selection,
        })
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn coverage_target(&self) -> u32 {
        self.coverage_target
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSettings {
        &self.selection
    }
}
