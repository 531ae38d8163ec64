//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `selection`: File acquisition, preview completion, clearing
//! - `submission`: Submit trigger, synthetic progress, outcomes
//! - `export`: Export requests and their completion

pub(crate) mod export;
pub(crate) mod selection;
pub(crate) mod submission;
pub(crate) mod update;


use std::path::PathBuf;
use std::time::Duration;

use lasval_core::{SelectedFile, SelectionId};

use crate::export::ExportArtifact;
use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Decode the file preview off the update loop
    DecodePreview {
        selection: SelectionId,
        file: SelectedFile,
        line_limit: usize,
    },

    /// Send the file to the validation service and start the progress ticker
    SubmitValidation {
        selection: SelectionId,
        file: SelectedFile,
    },

    /// Stop the progress ticker; schedule `RevealResults` after the delay if set
    FinishProgress { reveal_after: Option<Duration> },

    /// Write an export artifact into `directory`
    WriteExport {
        artifact: ExportArtifact,
        directory: PathBuf,
    },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
