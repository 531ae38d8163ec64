//! Main update function - handles state transitions (TEA pattern)

use std::time::Instant;

use crate::message::Message;
use crate::state::AppState;

use super::{export, selection, submission, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        // ─────────────────────────────────────────────────────────
        // Selection Messages
        // ─────────────────────────────────────────────────────────
        Message::ControlSelected(file) => selection::handle_acquire(state, file),
        Message::FilesDropped(files) => selection::handle_drop(state, files),
        Message::ClearSelection => selection::handle_clear(state),
        Message::PreviewDecoded { selection, preview } => {
            selection::handle_preview_decoded(state, selection, preview)
        }

        // ─────────────────────────────────────────────────────────
        // Submission Messages
        // ─────────────────────────────────────────────────────────
        Message::SubmitRequested => submission::handle_submit(state),
        Message::ProgressTick => submission::handle_progress_tick(state),
        Message::ValidationCompleted { selection, result } => {
            submission::handle_completed(state, selection, result)
        }
        Message::ValidationFailed { selection, failure } => {
            submission::handle_failed(state, selection, failure)
        }
        Message::RevealResults => submission::handle_reveal(state),

        // ─────────────────────────────────────────────────────────
        // Export Messages
        // ─────────────────────────────────────────────────────────
        Message::ExportRequested(format) => export::handle_export_requested(state, format),
        Message::ExportSaved { path } => export::handle_export_saved(state, path),
        Message::ExportFailed { error } => export::handle_export_failed(state, error),

        // ─────────────────────────────────────────────────────────
        // Notifications & Lifecycle
        // ─────────────────────────────────────────────────────────
        Message::DismissNotification(id) => {
            state.notifications.dismiss(id);
            UpdateResult::none()
        }

        Message::Tick => {
            state.notifications.expire(Instant::now());
            UpdateResult::none()
        }
    }
}
