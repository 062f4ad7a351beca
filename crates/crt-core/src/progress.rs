//! Durable progress storage for the chaos engine.
//!
//! A small JSON blob (solved puzzle ids, chaos level, timestamp) survives
//! page reloads. The engine is the only writer; puzzles never touch this
//! namespace.
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: a missing or corrupt blob never panics and
//!    never surfaces to the user; loading falls back to defaults.
//! 2. **Atomic writes**: file storage uses the write-then-rename pattern so
//!    a crash mid-save cannot corrupt existing progress.
//! 3. **Single writer**: only the engine calls [`ProgressStore::save`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | file I/O failure | save reported to caller, load treated as absent |
//! | `StorageError::Serialization` | malformed stored JSON | load returns `Ok(None)`, logged |
//! | missing file | first run, reset | `Ok(None)` |

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Logical storage key; doubles as the file stem for file-backed stores.
pub const PROGRESS_KEY: &str = "chaos-progress";

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during progress storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// JSON encode/decode failure.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Persisted shape
// ─────────────────────────────────────────────────────────────────────────────

/// The only durable entity in the system.
///
/// Written after every successful puzzle completion and after a full reset;
/// read once at engine construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    /// Solved puzzle identifiers.
    pub solved_puzzles: Vec<String>,
    /// Chaos level at the time of the save.
    pub chaos_level: f64,
    /// Unix timestamp (seconds) of the save.
    pub timestamp: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Store trait
// ─────────────────────────────────────────────────────────────────────────────

/// Pluggable backend for progress persistence.
pub trait ProgressStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load stored progress.
    ///
    /// `Ok(None)` means "no usable progress": first run, cleared state, or a
    /// blob that failed to parse. Parse failures are logged here rather than
    /// propagated so engine construction can never be crashed by stale data.
    fn load(&self) -> StorageResult<Option<SavedProgress>>;

    /// Persist progress, replacing any previous blob.
    fn save(&self, progress: &SavedProgress) -> StorageResult<()>;

    /// Remove all stored progress.
    fn clear(&self) -> StorageResult<()>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self) -> StorageResult<Option<SavedProgress>> {
        (**self).load()
    }

    fn save(&self, progress: &SavedProgress) -> StorageResult<()> {
        (**self).save(progress)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory store (testing, ephemeral sessions)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store. Progress is lost when the process exits.
#[derive(Default)]
pub struct MemoryProgress {
    slot: Mutex<Option<SavedProgress>>,
}

impl MemoryProgress {
    /// Create an empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store pre-populated with progress.
    #[must_use]
    pub fn with_progress(progress: SavedProgress) -> Self {
        Self {
            slot: Mutex::new(Some(progress)),
        }
    }
}

impl ProgressStore for MemoryProgress {
    fn name(&self) -> &str {
        "MemoryProgress"
    }

    fn load(&self) -> StorageResult<Option<SavedProgress>> {
        Ok(self.slot.lock().map(|g| g.clone()).unwrap_or(None))
    }

    fn save(&self, progress: &SavedProgress) -> StorageResult<()> {
        if let Ok(mut guard) = self.slot.lock() {
            *guard = Some(progress.clone());
        }
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        if let Ok(mut guard) = self.slot.lock() {
            *guard = None;
        }
        Ok(())
    }
}

impl fmt::Debug for MemoryProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.slot.lock().map(|g| g.is_some()).unwrap_or(false);
        f.debug_struct("MemoryProgress")
            .field("occupied", &occupied)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File store
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-file-backed store with atomic write-rename saves.
pub struct FileProgress {
    path: PathBuf,
}

impl FileProgress {
    /// Create a store at the given path. The file is created on first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the default per-user location:
    /// `$XDG_STATE_HOME/crt-chaos/chaos-progress.json`, falling back to
    /// `~/.local/state`, then the current directory.
    #[must_use]
    pub fn default_location() -> Self {
        let base = state_dir_or_fallback();
        Self {
            path: base.join("crt-chaos").join(format!("{PROGRESS_KEY}.json")),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

fn state_dir_or_fallback() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl ProgressStore for FileProgress {
    fn name(&self) -> &str {
        "FileProgress"
    }

    fn load(&self) -> StorageResult<Option<SavedProgress>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, SavedProgress>(reader) {
            Ok(progress) => Ok(Some(progress)),
            Err(e) => {
                // Corrupt progress must never crash startup.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring corrupt progress blob"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, progress: &SavedProgress) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, progress)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            solved = progress.solved_puzzles.len(),
            level = progress.chaos_level,
            "saved chaos progress"
        );
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProgress")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SavedProgress {
        SavedProgress {
            solved_puzzles: vec!["drunk-nav".into(), "mime-modal".into()],
            chaos_level: 2.0,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryProgress::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_pre_populated() {
        let store = MemoryProgress::with_progress(sample());
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn storage_error_display() {
        let io = StorageError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.to_string().contains("I/O error"));
        let ser = StorageError::Serialization("bad json".into());
        assert!(ser.to_string().contains("serialization"));
    }
}
