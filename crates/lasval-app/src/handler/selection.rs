//! Selection handlers: acquiring, previewing and clearing the current file

use lasval_core::prelude::*;
use lasval_core::{SelectedFile, SelectionId};

use crate::preview::Preview;
use crate::state::AppState;
use crate::workflow::{Phase, Selection, Workflow};

use super::{UpdateAction, UpdateResult};

/// Handle a file offered through the selection control
pub fn handle_acquire(state: &mut AppState, file: SelectedFile) -> UpdateResult {
    if state.phase() == Phase::Submitting {
        state.surface.reset();
        state.notifications.error(Error::SubmissionInFlight.to_string());
        return UpdateResult::none();
    }

    if !state.surface.offer(&file) {
        debug!("Selection unchanged, ignoring {}", file.name);
        return UpdateResult::none();
    }

    if let Err(e) = state.rules.check(&file) {
        info!("Rejected {}: {}", file.name, e);
        // Discard the file but keep whatever was current before
        state.surface.reset();
        state.notifications.error(e.to_string());
        return UpdateResult::none();
    }

    // Cleared so the same file offered again still fires
    state.surface.reset();

    let id = state.allocate_selection();
    info!(
        "Accepted {} {} ({} bytes)",
        file.name, id, file.size_bytes
    );

    let next = Workflow::Previewing {
        selection: Selection::new(id, file.clone()),
    };
    if !state.workflow.advance(next) {
        return UpdateResult::none();
    }

    UpdateResult::action(UpdateAction::DecodePreview {
        selection: id,
        file,
        line_limit: state.settings.upload.preview_lines,
    })
}

/// Handle a drop; only the first file is considered
pub fn handle_drop(state: &mut AppState, files: Vec<SelectedFile>) -> UpdateResult {
    match files.into_iter().next() {
        Some(file) => handle_acquire(state, file),
        None => UpdateResult::none(),
    }
}

pub fn handle_clear(state: &mut AppState) -> UpdateResult {
    if !state.clear() {
        state.notifications.error(Error::SubmissionInFlight.to_string());
    }
    UpdateResult::none()
}

/// Attach a decoded preview to the selection it was started for
pub fn handle_preview_decoded(
    state: &mut AppState,
    selection: SelectionId,
    preview: Preview,
) -> UpdateResult {
    let Some(current) = state.workflow.selection_mut() else {
        debug!("Dropping preview for {}: nothing selected", selection);
        return UpdateResult::none();
    };
    if current.id != selection {
        debug!("Dropping stale preview for {} (current {})", selection, current.id);
        return UpdateResult::none();
    }

    current.preview = Some(preview);

    if state.phase() == Phase::Previewing {
        state
            .workflow
            .transition(Phase::FileSelected, |old| match old {
                Workflow::Previewing { selection } => Workflow::FileSelected { selection },
                other => other,
            });
    }
    UpdateResult::none()
}
