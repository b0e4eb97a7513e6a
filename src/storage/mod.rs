//! JSON document persistence shared by the account and todo stores.
//!
//! Each store owns exactly one document: a pretty-printed JSON array that is
//! rewritten in full after every mutation.
//!
//! ## Failure policy
//! - Loading never fails hard. A missing file is an empty collection; an
//!   unreadable or unparseable file is discarded and reported as
//!   [`LoadStatus::Recovered`].
//! - Saving never fails hard either. The outcome comes back as a
//!   [`SaveStatus`] so callers can surface it or ignore it.
//! - Writes go to a temporary file next to the target and are renamed into
//!   place, so a crash mid-write leaves the previous document intact.

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Errors raised by the fallible `try_*` document operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened when a store read its document on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No document on disk yet (first run).
    Missing,
    /// Document parsed successfully.
    Loaded { records: usize },
    /// Document was unreadable; the store started empty.
    Recovered { reason: String },
}

/// What happened to the write a mutation triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Full collection written to disk.
    Saved,
    /// Nothing changed, so nothing was written.
    Skipped,
    /// Write failed; the in-memory state is ahead of disk.
    Failed { reason: String },
}

impl SaveStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a store mutation: the operation's value plus the outcome of
/// the write it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub save: SaveStatus,
}

impl<T> Committed<T> {
    pub(crate) fn new(value: T, save: SaveStatus) -> Self {
        Self { value, save }
    }

    pub(crate) fn unchanged(value: T) -> Self {
        Self {
            value,
            save: SaveStatus::Skipped,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Monotonic id counter seeded from the highest persisted id.
/// `None` once `u64::MAX` has been handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdCounter(Option<u64>);

impl IdCounter {
    /// Counter continuing after the highest of `ids` (starting at 1 when
    /// empty). `None` if the highest id leaves nothing to assign.
    pub(crate) fn after(ids: impl Iterator<Item = u64>) -> Option<Self> {
        ids.max()
            .unwrap_or(0)
            .checked_add(1)
            .map(|next| Self(Some(next)))
    }

    pub(crate) fn fresh() -> Self {
        Self(Some(1))
    }

    pub(crate) fn peek(&self) -> Option<u64> {
        self.0
    }

    pub(crate) fn allocate(&mut self) -> Option<u64> {
        let id = self.0?;
        self.0 = id.checked_add(1);
        Some(id)
    }
}

/// Load `document` and seed an id counter from it. A document whose highest
/// id is `u64::MAX` is treated like a corrupt one: the store starts empty.
pub(crate) fn load_with_ids<T: DeserializeOwned>(
    document: &JsonDocument,
    id_of: impl Fn(&T) -> u64,
) -> (Vec<T>, IdCounter, LoadStatus) {
    let (records, status) = document.load();
    match IdCounter::after(records.iter().map(&id_of)) {
        Some(counter) => (records, counter, status),
        None => {
            tracing::warn!(
                path = %document.path().display(),
                "Document ids are exhausted, starting empty"
            );
            (
                Vec::new(),
                IdCounter::fresh(),
                LoadStatus::Recovered {
                    reason: format!("record id {} leaves no ids to assign", u64::MAX),
                },
            )
        }
    }
}

/// A single JSON array document on disk.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records, falling back to an empty collection on any failure.
    pub fn load<T: DeserializeOwned>(&self) -> (Vec<T>, LoadStatus) {
        match self.try_load() {
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "No document yet, starting empty");
                (Vec::new(), LoadStatus::Missing)
            }
            Ok(Some(records)) => {
                let count = records.len();
                tracing::debug!(path = %self.path.display(), records = count, "Document loaded");
                (records, LoadStatus::Loaded { records: count })
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable document, starting empty"
                );
                (
                    Vec::new(),
                    LoadStatus::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// Load all records. `Ok(None)` means the file does not exist.
    pub fn try_load<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| PersistError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Overwrite the document with `records`, reporting instead of failing.
    pub fn save<T: Serialize>(&self, records: &[T]) -> SaveStatus {
        match self.try_save(records) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), records = records.len(), "Document saved");
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Document write failed, keeping in-memory state"
                );
                SaveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Overwrite the document with `records` via temp file + rename.
    pub fn try_save<T: Serialize>(&self, records: &[T]) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(records)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let write_err = |source: std::io::Error| PersistError::Write {
            path: self.path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
