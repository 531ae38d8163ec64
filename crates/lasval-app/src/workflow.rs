//! Workflow state machine
//!
//! `Phase` is the bare state name used by the transition table. `Workflow`
//! carries the data each phase owns, so a phase without a result simply has
//! no result to export or render.

use std::fmt;
use std::sync::Arc;

use lasval_core::{SelectedFile, SelectionId, ValidationResult};

use crate::message::SubmitFailure;
use crate::preview::Preview;
use crate::progress::Progress;
use crate::results::RenderedResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    /// File accepted, preview decode in flight
    Previewing,
    /// File accepted and previewed
    FileSelected,
    Submitting,
    ResultsShown,
    /// Last submission failed; the file is retained
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Previewing => "previewing",
            Phase::FileSelected => "file_selected",
            Phase::Submitting => "submitting",
            Phase::ResultsShown => "results_shown",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Allowed transitions
pub const TRANSITIONS: &[(Phase, &[Phase])] = &[
    (Phase::Idle, &[Phase::Previewing]),
    (
        Phase::Previewing,
        &[
            Phase::FileSelected,
            Phase::Previewing,
            Phase::Submitting,
            Phase::Idle,
        ],
    ),
    (
        Phase::FileSelected,
        &[Phase::Previewing, Phase::Submitting, Phase::Idle],
    ),
    (Phase::Submitting, &[Phase::ResultsShown, Phase::Error]),
    (
        Phase::ResultsShown,
        &[Phase::Previewing, Phase::Submitting, Phase::Idle],
    ),
    (
        Phase::Error,
        &[Phase::Previewing, Phase::Submitting, Phase::Idle],
    ),
];

pub fn is_allowed(from: Phase, to: Phase) -> bool {
    TRANSITIONS
        .iter()
        .find(|(phase, _)| *phase == from)
        .map(|(_, targets)| targets.contains(&to))
        .unwrap_or(false)
}

/// The current file together with its stamp and preview
#[derive(Debug, Clone)]
pub struct Selection {
    pub id: SelectionId,
    pub file: SelectedFile,
    pub preview: Option<Preview>,
}

impl Selection {
    pub fn new(id: SelectionId, file: SelectedFile) -> Self {
        Self {
            id,
            file,
            preview: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum Workflow {
    #[default]
    Idle,
    Previewing {
        selection: Selection,
    },
    FileSelected {
        selection: Selection,
    },
    Submitting {
        selection: Selection,
        progress: Progress,
        /// Set when the response arrived and the settle delay is running
        received: Option<Arc<ValidationResult>>,
    },
    ResultsShown {
        selection: Selection,
        result: Arc<ValidationResult>,
        rendered: RenderedResults,
    },
    Error {
        selection: Selection,
        failure: SubmitFailure,
    },
}

impl Workflow {
    pub fn phase(&self) -> Phase {
        match self {
            Workflow::Idle => Phase::Idle,
            Workflow::Previewing { .. } => Phase::Previewing,
            Workflow::FileSelected { .. } => Phase::FileSelected,
            Workflow::Submitting { .. } => Phase::Submitting,
            Workflow::ResultsShown { .. } => Phase::ResultsShown,
            Workflow::Error { .. } => Phase::Error,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Workflow::Idle => None,
            Workflow::Previewing { selection }
            | Workflow::FileSelected { selection }
            | Workflow::Submitting { selection, .. }
            | Workflow::ResultsShown { selection, .. }
            | Workflow::Error { selection, .. } => Some(selection),
        }
    }

    pub fn selection_mut(&mut self) -> Option<&mut Selection> {
        match self {
            Workflow::Idle => None,
            Workflow::Previewing { selection }
            | Workflow::FileSelected { selection }
            | Workflow::Submitting { selection, .. }
            | Workflow::ResultsShown { selection, .. }
            | Workflow::Error { selection, .. } => Some(selection),
        }
    }

    /// Take the selection out, leaving `Idle` behind
    pub fn take_selection(&mut self) -> Option<Selection> {
        match std::mem::take(self) {
            Workflow::Idle => None,
            Workflow::Previewing { selection }
            | Workflow::FileSelected { selection }
            | Workflow::Submitting { selection, .. }
            | Workflow::ResultsShown { selection, .. }
            | Workflow::Error { selection, .. } => Some(selection),
        }
    }

    /// Move to `next` if the table allows it.
    ///
    /// Returns false and leaves `self` untouched otherwise.
    pub fn advance(&mut self, next: Workflow) -> bool {
        let from = self.phase();
        let to = next.phase();
        if !is_allowed(from, to) {
            tracing::warn!("Refused workflow transition {} -> {}", from, to);
            return false;
        }
        tracing::debug!("Workflow {} -> {}", from, to);
        *self = next;
        true
    }

    /// Move to phase `to`, building the next state from the current one by value.
    ///
    /// `build` is only called when the table allows the transition and must
    /// return a workflow in phase `to`.
    pub fn transition(&mut self, to: Phase, build: impl FnOnce(Workflow) -> Workflow) -> bool {
        let from = self.phase();
        if !is_allowed(from, to) {
            tracing::warn!("Refused workflow transition {} -> {}", from, to);
            return false;
        }
        let next = build(std::mem::take(self));
        debug_assert_eq!(next.phase(), to);
        tracing::debug!("Workflow {} -> {}", from, next.phase());
        *self = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        Selection::new(
            SelectionId(1),
            SelectedFile::new("well.las", 0, b"~V\n".to_vec()),
        )
    }

    #[test]
    fn test_submitting_only_leaves_to_outcome() {
        assert!(is_allowed(Phase::Submitting, Phase::ResultsShown));
        assert!(is_allowed(Phase::Submitting, Phase::Error));
        assert!(!is_allowed(Phase::Submitting, Phase::Previewing));
        assert!(!is_allowed(Phase::Submitting, Phase::Idle));
        assert!(!is_allowed(Phase::Submitting, Phase::Submitting));
    }

    #[test]
    fn test_idle_cannot_submit() {
        assert!(!is_allowed(Phase::Idle, Phase::Submitting));
        assert!(!is_allowed(Phase::Idle, Phase::ResultsShown));
    }

    #[test]
    fn test_every_phase_has_a_row() {
        for phase in [
            Phase::Idle,
            Phase::Previewing,
            Phase::FileSelected,
            Phase::Submitting,
            Phase::ResultsShown,
            Phase::Error,
        ] {
            assert!(TRANSITIONS.iter().any(|(p, _)| *p == phase), "{phase}");
        }
    }

    #[test]
    fn test_advance_refuses_disallowed() {
        let mut workflow = Workflow::Idle;
        let refused = workflow.advance(Workflow::Submitting {
            selection: selection(),
            progress: Progress::default(),
            received: None,
        });
        assert!(!refused);
        assert_eq!(workflow.phase(), Phase::Idle);

        assert!(workflow.advance(Workflow::Previewing {
            selection: selection()
        }));
        assert_eq!(workflow.phase(), Phase::Previewing);
    }

    #[test]
    fn test_transition_moves_selection() {
        let mut workflow = Workflow::Previewing {
            selection: selection(),
        };
        let moved = workflow.transition(Phase::FileSelected, |old| match old {
            Workflow::Previewing { selection } => Workflow::FileSelected { selection },
            other => other,
        });
        assert!(moved);
        assert_eq!(workflow.phase(), Phase::FileSelected);
        assert_eq!(workflow.selection().unwrap().id, SelectionId(1));

        let mut idle = Workflow::Idle;
        assert!(!idle.transition(Phase::ResultsShown, |old| old));
        assert_eq!(idle.phase(), Phase::Idle);
    }

    #[test]
    fn test_take_selection_leaves_idle() {
        let mut workflow = Workflow::FileSelected {
            selection: selection(),
        };
        let taken = workflow.take_selection().unwrap();
        assert_eq!(taken.file.name, "well.las");
        assert_eq!(workflow.phase(), Phase::Idle);
    }
}
