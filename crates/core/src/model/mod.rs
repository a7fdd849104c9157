mod explanation;
mod ids;
mod question;
mod settings;
mod stats;

pub use ids::{ParseIdError, QuestionId};

pub use explanation::{Explanation, ExplanationError, ExplanationLink, Explanations};
pub use question::{Choice, QuestionError, QuestionRecord};
pub use settings::{QuizSettings, SelectionSettings, SettingsError};
pub use stats::{QuestionStat, StatsState};
