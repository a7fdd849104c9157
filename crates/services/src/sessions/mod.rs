mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{QuizSelector, SelectionPlan};
pub use progress::SessionProgress;
pub use service::{AnswerState, GradeOutcome, QuizSession, QuizSummary};
pub use workflow::{CoverageReport, QuizService};
