//! Archive of completed events.
//!
//! The archive is a single JSON file holding an ordered array of
//! [`ArchiveRecord`]s. Each append reads the whole array, pushes one record
//! and rewrites the file. The rewrite goes to `<file>.tmp` first and is then
//! renamed over the archive, so readers see either the old or the new array.
//!
//! # Thread Safety
//!
//! [`Archive`] serializes its read-modify-write cycle behind an internal
//! mutex, so overlapping appends from the same process never lose updates.
//! It does not guard against other processes writing the same file.
//!
//! # File Format
//!
//! ```json
//! [
//!   {
//!     "timestamp": "2026-01-15T10:30:00.000Z",
//!     "title": "Standup",
//!     "description": "Daily sync"
//!   }
//! ]
//! ```
//!
//! A missing file is an empty archive. A file that does not parse is left
//! untouched and reported as [`ArchiveError::Corrupt`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use remind_core::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Archive errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Reading the archive file failed for a reason other than absence.
    #[error("failed to read archive {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing the archive file failed.
    #[error("failed to write archive {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The existing archive is not a JSON array of records.
    #[error("archive {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serializing the records failed.
    #[error("failed to serialize archive: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// One completed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// When the event was archived.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

impl ArchiveRecord {
    /// Builds the record for `event` completed at `now`.
    pub fn completed(event: &Event, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            title: event.title.clone(),
            description: event.description.clone(),
        }
    }
}

/// Timestamps as `2026-01-15T10:30:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Handle to the archive file.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Archive {
    /// Opens the archive at `path`. The file is created on first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all records in completion order.
    pub fn read_all(&self) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    /// Appends `record` and rewrites the file. Returns the new record count.
    pub fn append(&self, record: ArchiveRecord) -> Result<usize, ArchiveError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load()?;
        records.push(record);
        self.save(&records)?;

        tracing::debug!(path = ?self.path, count = records.len(), "archive rewritten");
        Ok(records.len())
    }

    fn load(&self) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|source| ArchiveError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ArchiveError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, records: &[ArchiveRecord]) -> Result<(), ArchiveError> {
        let write_err = |source| ArchiveError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(records).map_err(ArchiveError::Serialize)?;

        // Write to a sibling temp file, then rename over the archive, so an
        // interrupted write never leaves a truncated archive behind.
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, json).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
