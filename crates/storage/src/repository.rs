use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::warn;
use quiz_core::model::StatsState;
use thiserror::Error;

use crate::codec::{encode_stats_state, parse_stats_state};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Raw slot holding the single serialized stats record.
pub trait StatsBackend: Send + Sync {
    /// Read the stored record, `Ok(None)` when nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot exists but cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    fn write(&self, data: &str) -> Result<(), StorageError>;
}

/// In-memory slot for tests and prototyping. Clones share the same slot.
///
/// Reads and writes can be made to fail to simulate a broken device.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    data: Arc<Mutex<Option<String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contents(raw: impl Into<String>) -> Self {
        let backend = Self::new();
        if let Ok(mut guard) = backend.data.lock() {
            *guard = Some(raw.into());
        }
        backend
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current raw contents of the slot.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.data.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StatsBackend for InMemoryBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        let guard = self
            .data
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }

    fn write(&self, data: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut guard = self
            .data
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *guard = Some(data.to_owned());
        Ok(())
    }
}

/// One JSON file on the learner's device.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatsBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, data: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // write-then-rename so a crash never leaves a half-written record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Durable selection history behind an injected backend.
#[derive(Clone)]
pub struct StatsStore {
    backend: Arc<dyn StatsBackend>,
}

impl StatsStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StatsBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(path)))
    }

    /// Load the stored history. Never fails: missing, unreadable or corrupt data
    /// all yield the empty history.
    #[must_use]
    pub fn load(&self) -> StatsState {
        match self.backend.read() {
            Ok(Some(raw)) => parse_stats_state(&raw),
            Ok(None) => StatsState::new(),
            Err(e) => {
                warn!("could not read quiz stats, starting without history: {e}");
                StatsState::new()
            }
        }
    }

    /// Persist `state`, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails. Callers treat this as
    /// best effort.
    pub fn save(&self, state: &StatsState) -> Result<(), StorageError> {
        let raw = encode_stats_state(state)?;
        self.backend.write(&raw)
    }
}
