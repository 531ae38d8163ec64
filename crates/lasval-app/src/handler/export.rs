//! Export handlers

use std::path::PathBuf;

use chrono::Utc;

use lasval_core::prelude::*;
use lasval_core::ExportFormat;

use crate::export;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

pub fn handle_export_requested(state: &mut AppState, format: ExportFormat) -> UpdateResult {
    let (Some(result), Some(file)) = (state.current_result(), state.current_file()) else {
        state
            .notifications
            .error(Error::ExportWithNoResult.to_string());
        return UpdateResult::none();
    };

    match export::export(result, &file.name, format, Utc::now()) {
        Ok(artifact) => {
            debug!("Prepared export {}", artifact.file_name);
            UpdateResult::action(UpdateAction::WriteExport {
                artifact,
                directory: state.settings.export.directory.clone(),
            })
        }
        Err(e) => {
            error!("Failed to serialize export: {}", e);
            state.notifications.error(format!("Export failed: {}", e));
            UpdateResult::none()
        }
    }
}

pub fn handle_export_saved(state: &mut AppState, path: PathBuf) -> UpdateResult {
    info!("Exported results to {}", path.display());
    state
        .notifications
        .success(format!("Results exported to {}", path.display()));
    state.exported.push(path);
    UpdateResult::none()
}

pub fn handle_export_failed(state: &mut AppState, error: String) -> UpdateResult {
    state.export_failures += 1;
    state
        .notifications
        .error(format!("Export failed: {}", error));
    UpdateResult::none()
}
