//! # lasval-core - Core Domain Types
//!
//! Foundation crate for the LAS validator client. Provides domain types,
//! error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`SelectedFile`] - A file accepted for validation, with its raw bytes
//! - [`SelectionId`] - Monotonic stamp of one acceptance
//! - [`NotificationKind`], [`ExportFormat`] - Small enums shared across crates
//!
//! ### Validation Results (`result`)
//! - [`ValidationResult`] - Parsed response of the validation service
//! - [`Statistics`] - Open statistics mapping with typed accessors
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use lasval_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod result;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use result::{Statistics, ValidationResult};
pub use types::{ExportFormat, NotificationKind, SelectedFile, SelectionId};
