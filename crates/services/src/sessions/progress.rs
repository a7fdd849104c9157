/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub graded: usize,
    pub remaining: usize,
    pub correct: usize,
    pub is_complete: bool,
}
