//! Application state (Model in TEA pattern)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lasval_core::{SelectedFile, SelectionId, ValidationResult};

use crate::config::Settings;
use crate::notifications::NotificationCenter;
use crate::preview::Preview;
use crate::progress::Progress;
use crate::results::RenderedResults;
use crate::selection::{AcceptanceRules, SelectionSurface};
use crate::workflow::{Phase, Workflow};

/// Complete application state (the Model in TEA)
#[derive(Debug)]
pub struct AppState {
    /// Current workflow phase and the data it owns
    pub workflow: Workflow,

    /// Value held by the selection control
    pub surface: SelectionSurface,

    pub notifications: NotificationCenter,

    pub rules: AcceptanceRules,

    pub settings: Settings,

    /// Artifacts written during this session, oldest first
    pub exported: Vec<PathBuf>,

    pub export_failures: usize,

    /// Stamp handed to the next accepted file
    next_selection: SelectionId,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            workflow: Workflow::Idle,
            surface: SelectionSurface::default(),
            notifications: NotificationCenter::new(Duration::from_millis(
                settings.notifications.timeout_ms,
            )),
            rules: AcceptanceRules::from_settings(&settings.upload),
            settings,
            exported: Vec::new(),
            export_failures: 0,
            next_selection: SelectionId::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.workflow.phase()
    }

    /// Allocate the stamp for a newly accepted file
    pub fn allocate_selection(&mut self) -> SelectionId {
        self.next_selection = self.next_selection.next();
        self.next_selection
    }

    pub fn current_file(&self) -> Option<&SelectedFile> {
        self.workflow.selection().map(|s| &s.file)
    }

    pub fn current_selection_id(&self) -> Option<SelectionId> {
        self.workflow.selection().map(|s| s.id)
    }

    /// The last received result; only present while results are shown
    pub fn current_result(&self) -> Option<&Arc<ValidationResult>> {
        match &self.workflow {
            Workflow::ResultsShown { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn rendered_results(&self) -> Option<&RenderedResults> {
        match &self.workflow {
            Workflow::ResultsShown { rendered, .. } => Some(rendered),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.workflow.selection().and_then(|s| s.preview.as_ref())
    }

    /// Displayed progress; `None` hides the indicator
    pub fn progress(&self) -> Option<Progress> {
        match &self.workflow {
            Workflow::Submitting { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// Whether the validate trigger is enabled
    pub fn can_submit(&self) -> bool {
        matches!(
            self.phase(),
            Phase::Previewing | Phase::FileSelected | Phase::ResultsShown | Phase::Error
        )
    }

    /// Drop the current file and everything derived from it.
    ///
    /// Returns false while a submission is in flight; nothing changes then.
    pub fn clear(&mut self) -> bool {
        match self.phase() {
            Phase::Submitting => false,
            Phase::Idle => {
                self.surface.reset();
                true
            }
            _ => {
                self.surface.reset();
                self.workflow.advance(Workflow::Idle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = AppState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.current_file().is_none());
        assert!(state.current_result().is_none());
        assert!(state.progress().is_none());
        assert!(!state.can_submit());
    }

    #[test]
    fn test_selection_ids_increase() {
        let mut state = AppState::new();
        let a = state.allocate_selection();
        let b = state.allocate_selection();
        assert!(b > a);
    }

    #[test]
    fn test_rules_follow_settings() {
        let mut settings = Settings::default();
        settings.upload.max_file_size_bytes = 42;
        settings.upload.required_extension = ".LAS".to_string();
        let state = AppState::with_settings(settings);
        assert_eq!(state.rules.max_size_bytes, 42);
        assert_eq!(state.rules.required_extension, ".las");
    }

    #[test]
    fn test_clear_returns_to_idle_unless_submitting() {
        use crate::progress::Progress;
        use crate::workflow::Selection;

        let mut state = AppState::new();
        let id = state.allocate_selection();
        let file = SelectedFile::new("well.las", 1, b"~V\n".to_vec());
        state.workflow = Workflow::FileSelected {
            selection: Selection::new(id, file.clone()),
        };
        assert!(state.clear());
        assert_eq!(state.phase(), Phase::Idle);

        state.workflow = Workflow::Submitting {
            selection: Selection::new(id, file),
            progress: Progress::default(),
            received: None,
        };
        assert!(!state.clear());
        assert_eq!(state.phase(), Phase::Submitting);
    }
}
