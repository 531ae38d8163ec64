//! Core domain types shared by the client, controller and runners

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Monotonic stamp of one accepted selection.
///
/// Background work (preview decode) carries the id of the selection it was
/// started for so late completions for a replaced file can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SelectionId(pub u64);

impl SelectionId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A file offered for, or accepted into, the validation workflow.
///
/// Never mutated after construction; a new selection replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    /// Last modification time in milliseconds since the Unix epoch
    pub last_modified_ms: i64,
    pub raw_bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, last_modified_ms: i64, raw_bytes: impl Into<Arc<[u8]>>) -> Self {
        let raw_bytes = raw_bytes.into();
        Self {
            name: name.into(),
            size_bytes: raw_bytes.len() as u64,
            last_modified_ms,
            raw_bytes,
        }
    }

    /// Read a file from disk, taking its name and modification time from the filesystem
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let last_modified_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::input_rejected(format!("Invalid file name: {}", path.display())))?
            .to_string();

        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, last_modified_ms, bytes))
    }

    /// Same name, size and modification time.
    pub fn same_identity(&self, other: &SelectedFile) -> bool {
        self.name == other.name
            && self.size_bytes == other.size_bytes
            && self.last_modified_ms == other.last_modified_ms
    }
}

/// Kind of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// Export artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(Error::config(format!("Unknown export format: {other}"))),
        }
    }
}
