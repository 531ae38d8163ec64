//! Headless mode - NDJSON event output of the validation workflow
//!
//! `lasval validate` drives the same Engine an interactive front end would
//! and reports every workflow step as one JSON object per line on stdout.
//! Each object carries an `event` tag and a millisecond `timestamp`.
//!
//! # Example Output
//!
//! ```json
//! {"event":"file_selected","name":"well.las","size_bytes":20480,"timestamp":1704700001000}
//! {"event":"preview_ready","shown_lines":50,"total_lines":812,"section_lines":6,"available":true,"timestamp":1704700001004}
//! {"event":"progress","percent":10,"timestamp":1704700001200}
//! {"event":"validation_completed","valid":true,"errors":0,"warnings":1,"score":96,"timestamp":1704700002000}
//! ```

pub mod runner;

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use lasval_app::{EngineEvent, FailureKind};
use lasval_core::ValidationResult;

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A file passed the acceptance rules
    FileSelected {
        name: String,
        size_bytes: u64,
        timestamp: i64,
    },

    /// A file was turned away before any request was sent
    FileRejected { reason: String, timestamp: i64 },

    PreviewReady {
        shown_lines: usize,
        total_lines: usize,
        section_lines: usize,
        available: bool,
        timestamp: i64,
    },

    Progress { percent: u8, timestamp: i64 },

    ValidationCompleted {
        valid: bool,
        errors: usize,
        warnings: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        timestamp: i64,
    },

    /// `kind` is `server` or `transport`
    ValidationFailed {
        kind: String,
        message: String,
        timestamp: i64,
    },

    Notification {
        kind: String,
        message: String,
        timestamp: i64,
    },

    ExportSaved { path: String, timestamp: i64 },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Translate an engine event; returns `None` for events with no
    /// headless counterpart
    pub fn from_engine(event: &EngineEvent) -> Option<Self> {
        let timestamp = Self::now();
        let event = match event {
            EngineEvent::FileAccepted {
                name, size_bytes, ..
            } => Self::FileSelected {
                name: name.clone(),
                size_bytes: *size_bytes,
                timestamp,
            },
            EngineEvent::PreviewReady {
                shown_lines,
                total_lines,
                section_lines,
                available,
                ..
            } => Self::PreviewReady {
                shown_lines: *shown_lines,
                total_lines: *total_lines,
                section_lines: *section_lines,
                available: *available,
                timestamp,
            },
            EngineEvent::ProgressChanged { percent } => Self::Progress {
                percent: *percent,
                timestamp,
            },
            EngineEvent::ResultsRevealed { result, .. } => Self::validation_completed(result),
            EngineEvent::SubmissionFailed { kind, message } => Self::ValidationFailed {
                kind: match kind {
                    FailureKind::Server => "server",
                    FailureKind::Transport => "transport",
                }
                .to_string(),
                message: message.clone(),
                timestamp,
            },
            EngineEvent::Notification { kind, message } => Self::Notification {
                kind: kind.to_string(),
                message: message.clone(),
                timestamp,
            },
            EngineEvent::ExportSaved { path } => Self::export_saved(path),
            EngineEvent::PhaseChanged { .. }
            | EngineEvent::ExportFailed
            | EngineEvent::Shutdown => return None,
        };
        Some(event)
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn file_rejected(reason: impl Into<String>) -> Self {
        Self::FileRejected {
            reason: reason.into(),
            timestamp: Self::now(),
        }
    }

    pub fn validation_completed(result: &ValidationResult) -> Self {
        Self::ValidationCompleted {
            valid: result.valid,
            errors: result.errors.len(),
            warnings: result.warnings.len(),
            score: result.score(),
            summary: result.summary.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn export_saved(path: &Path) -> Self {
        Self::ExportSaved {
            path: path.display().to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }
}
