//! Append-only query history kept as a single JSON document.
//!
//! Every append rewrites the whole file. A missing or unparseable file is
//! treated as an empty history; individual records of an unexpected shape
//! are carried through rewrites untouched. A failed write is reported to
//! the caller and leaves the previous file in place.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{HistoryDocument, QueryEntry};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read history file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse history file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write history file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// History log backed by one file on disk.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the backing file, reporting exactly what went wrong.
    pub fn read(&self) -> Result<HistoryDocument, HistoryError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                HistoryError::NotFound(self.path.clone())
            } else {
                HistoryError::Read { path: self.path.clone(), source }
            }
        })?;

        serde_json::from_str(&contents).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Current document, or an empty one when the file is absent or
    /// cannot be parsed.
    pub fn load(&self) -> HistoryDocument {
        match self.read() {
            Ok(doc) => doc,
            Err(HistoryError::NotFound(path)) => {
                debug!(path = %path.display(), "no history file yet, starting empty");
                HistoryDocument::default()
            }
            Err(err) => {
                warn!(error = %err, "history unreadable, starting empty");
                HistoryDocument::default()
            }
        }
    }

    /// Add `entry` after all existing entries and persist the document.
    ///
    /// Returns the number of entries now stored.
    pub fn append(&self, entry: QueryEntry) -> Result<usize, HistoryError> {
        let mut doc = self.load();
        doc.push(entry);
        self.save(&doc)?;

        debug!(path = %self.path.display(), total = doc.len(), "history appended");
        Ok(doc.len())
    }

    /// At most the last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<QueryEntry> {
        self.load().tail(n)
    }

    /// Write `doc` as pretty JSON via a sibling temp file and a rename, so
    /// the target is either the old or the new document.
    fn save(&self, doc: &HistoryDocument) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(doc)?;
        let write_err = |source: io::Error| HistoryError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.temp_path();
        if let Err(source) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            warn!(path = %self.path.display(), error = %source, "failed to persist history");
            return Err(write_err(source));
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
