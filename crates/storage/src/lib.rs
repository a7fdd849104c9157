#![forbid(unsafe_code)]

pub mod bank;
pub mod codec;
pub mod explanations;
pub mod repository;

pub use bank::{BankError, load_bank, read_bank};
pub use codec::{encode_stats_state, parse_stats_state};
pub use explanations::{load_explanations, parse_explanations};
pub use repository::{FileBackend, InMemoryBackend, StatsBackend, StatsStore, StorageError};
