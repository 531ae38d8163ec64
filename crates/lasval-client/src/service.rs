//! Validation service abstraction
//!
//! The controller talks to the remote validator through this trait so tests
//! and the headless runner can substitute an in-process implementation.

use lasval_core::prelude::*;
use lasval_core::{SelectedFile, ValidationResult};

/// Submit one file for validation
#[trait_variant::make(ValidationService: Send)]
pub trait LocalValidationService {
    /// Upload the file and wait for the verdict.
    ///
    /// Returns `Error::ServerError` for non-success responses and
    /// `Error::TransportError` when no response was received.
    async fn validate(&self, file: SelectedFile) -> Result<ValidationResult>;
}
