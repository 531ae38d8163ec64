//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`, so subscribers see a consistent view of state
//! changes. The headless runner turns them into NDJSON lines.

use std::path::PathBuf;
use std::sync::Arc;

use lasval_core::{NotificationKind, SelectionId, ValidationResult};

use crate::message::FailureKind;
use crate::workflow::Phase;

#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Workflow
    // ─────────────────────────────────────────────────────────
    PhaseChanged { old_phase: Phase, new_phase: Phase },

    /// A file passed the acceptance rules and became current
    FileAccepted {
        selection: SelectionId,
        name: String,
        size_bytes: u64,
    },

    PreviewReady {
        selection: SelectionId,
        shown_lines: usize,
        total_lines: usize,
        section_lines: usize,
        available: bool,
    },

    ProgressChanged { percent: u8 },

    ResultsRevealed {
        result: Arc<ValidationResult>,
        html: String,
    },

    SubmissionFailed { kind: FailureKind, message: String },

    // ─────────────────────────────────────────────────────────
    // Notifications & Export
    // ─────────────────────────────────────────────────────────
    Notification {
        kind: NotificationKind,
        message: String,
    },

    ExportSaved { path: PathBuf },

    ExportFailed,

    Shutdown,
}
