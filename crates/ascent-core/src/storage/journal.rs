//! Practice journal.
//!
//! Finished sessions become [`PracticeEntry`] records in a JSON array at
//! `<data_dir>/entries.json`, newest first. The record shape is flat so
//! other front ends can read the same file.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::data_dir;
use crate::error::Result;
use crate::summary::SessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Practice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub title: String,
    pub minutes: u32,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl PracticeEntry {
    pub fn from_summary(summary: &SessionSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Local::now().date_naive(),
            kind: EntryKind::Practice,
            title: summary.title.clone(),
            minutes: summary.total_practice_minutes,
            note: summary.note.clone(),
            created_at: Utc::now(),
        }
    }
}

/// File-backed entry list.
#[derive(Debug, Clone)]
pub struct EntryLog {
    path: PathBuf,
}

impl EntryLog {
    /// Journal in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("entries.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, newest first. A missing file is an empty journal.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn entries(&self) -> Result<Vec<PracticeEntry>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a finished session and return the created entry.
    ///
    /// # Errors
    /// Returns an error if the journal cannot be read or written.
    pub fn record(&self, summary: &SessionSummary) -> Result<PracticeEntry> {
        let entry = PracticeEntry::from_summary(summary);
        let mut entries = self.entries()?;
        entries.insert(0, entry.clone());
        self.write(&entries)?;
        tracing::info!(id = %entry.id, minutes = entry.minutes, "practice entry recorded");
        Ok(entry)
    }

    fn write(&self, entries: &[PracticeEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
