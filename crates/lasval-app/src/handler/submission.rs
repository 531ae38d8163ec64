//! Submission handlers: the validate trigger, progress and outcomes

use std::sync::Arc;
use std::time::Duration;

use lasval_core::prelude::*;
use lasval_core::{SelectionId, ValidationResult};

use crate::message::SubmitFailure;
use crate::progress::Progress;
use crate::results;
use crate::state::AppState;
use crate::workflow::{Phase, Workflow};

use super::{UpdateAction, UpdateResult};

pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const COMPLETED_MESSAGE: &str = "Validation completed";

pub fn handle_submit(state: &mut AppState) -> UpdateResult {
    match state.phase() {
        Phase::Idle => {
            state.notifications.error(NO_FILE_MESSAGE);
            return UpdateResult::none();
        }
        // Trigger is disabled; a second attempt is dropped, not queued
        Phase::Submitting => {
            debug!("Submit ignored: a validation is already in flight");
            return UpdateResult::none();
        }
        _ => {}
    }

    let progress = Progress::from_settings(&state.settings.progress);
    let moved = state
        .workflow
        .transition(Phase::Submitting, |mut old| match old.take_selection() {
            Some(selection) => Workflow::Submitting {
                selection,
                progress,
                received: None,
            },
            None => old,
        });
    if !moved {
        return UpdateResult::none();
    }

    match state.workflow.selection() {
        Some(selection) => {
            info!("Submitting {} {}", selection.file.name, selection.id);
            UpdateResult::action(UpdateAction::SubmitValidation {
                selection: selection.id,
                file: selection.file.clone(),
            })
        }
        None => UpdateResult::none(),
    }
}

pub fn handle_progress_tick(state: &mut AppState) -> UpdateResult {
    if let Workflow::Submitting {
        progress,
        received: None,
        ..
    } = &mut state.workflow
    {
        let percent = progress.advance();
        trace!("Progress {}%", percent);
    }
    UpdateResult::none()
}

/// Response arrived: jump to 100% and wait out the settle delay
pub fn handle_completed(
    state: &mut AppState,
    selection: SelectionId,
    result: Arc<ValidationResult>,
) -> UpdateResult {
    let settle = Duration::from_millis(state.settings.progress.settle_ms);

    match &mut state.workflow {
        Workflow::Submitting {
            selection: current,
            progress,
            received,
        } if current.id == selection && received.is_none() => {
            info!(
                "Validation of {} finished: valid={}",
                current.file.name, result.valid
            );
            progress.complete();
            *received = Some(result);
            UpdateResult::action(UpdateAction::FinishProgress {
                reveal_after: Some(settle),
            })
        }
        _ => {
            warn!("Dropping validation result for {}", selection);
            UpdateResult::none()
        }
    }
}

pub fn handle_failed(
    state: &mut AppState,
    selection: SelectionId,
    failure: SubmitFailure,
) -> UpdateResult {
    let matches = matches!(
        &state.workflow,
        Workflow::Submitting { selection: current, received: None, .. } if current.id == selection
    );
    if !matches {
        warn!("Dropping validation failure for {}", selection);
        return UpdateResult::none();
    }

    warn!("Validation failed ({:?}): {}", failure.kind, failure.message);
    let message = failure.message.clone();
    state.workflow.transition(Phase::Error, |old| match old {
        Workflow::Submitting { selection, .. } => Workflow::Error { selection, failure },
        other => other,
    });
    state.notifications.error(message);

    UpdateResult::action(UpdateAction::FinishProgress { reveal_after: None })
}

/// Settle delay elapsed: render and show the received result
pub fn handle_reveal(state: &mut AppState) -> UpdateResult {
    let ready = matches!(
        &state.workflow,
        Workflow::Submitting {
            received: Some(_),
            ..
        }
    );
    if !ready {
        debug!("RevealResults with nothing to reveal");
        return UpdateResult::none();
    }

    state.workflow.transition(Phase::ResultsShown, |old| match old {
        Workflow::Submitting {
            selection,
            received: Some(result),
            ..
        } => {
            let rendered = results::render(&result);
            Workflow::ResultsShown {
                selection,
                result,
                rendered,
            }
        }
        other => other,
    });
    state.notifications.success(COMPLETED_MESSAGE);
    UpdateResult::none()
}
