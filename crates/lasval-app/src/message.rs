//! Message types for the application (TEA pattern)

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lasval_core::{Error, ExportFormat, SelectedFile, SelectionId, ValidationResult};

use crate::notifications::NotificationId;
use crate::preview::Preview;

/// How a submission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered with a non-success status or a malformed body
    Server,
    /// No response at all
    Transport,
}

/// A failed submission, kept in the `Error` phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmitFailure {
    /// Classify a client error
    pub fn from_error(error: &Error) -> Self {
        let kind = match error {
            Error::TransportError { .. } => FailureKind::Transport,
            _ => FailureKind::Server,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// All possible messages/events in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────
    /// A file was chosen through the selection control
    ControlSelected(SelectedFile),

    /// Files were dropped onto the drop zone; only the first is used
    FilesDropped(Vec<SelectedFile>),

    /// Discard the current file and any result
    ClearSelection,

    /// Background preview decode finished
    PreviewDecoded {
        selection: SelectionId,
        preview: Preview,
    },

    // ─────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────
    /// User pressed the validate trigger
    SubmitRequested,

    /// Synthetic progress timer fired
    ProgressTick,

    ValidationCompleted {
        selection: SelectionId,
        result: Arc<ValidationResult>,
    },

    ValidationFailed {
        selection: SelectionId,
        failure: SubmitFailure,
    },

    /// Settle delay elapsed; show the received result
    RevealResults,

    // ─────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────
    ExportRequested(ExportFormat),

    ExportSaved { path: PathBuf },

    ExportFailed { error: String },

    // ─────────────────────────────────────────────────────────
    // Notifications & lifecycle
    // ─────────────────────────────────────────────────────────
    DismissNotification(NotificationId),

    /// Periodic tick; expires notifications
    Tick,
}
