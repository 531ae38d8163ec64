//! LAS Validator Library
//!
//! Command-line front ends over the workspace crates: the headless
//! validation runner and the shell caching proxy.

pub mod headless;
pub mod proxy;

pub use headless::runner::{run_validate, run_with_service, Outcome, ValidateOptions};
pub use headless::HeadlessEvent;
pub use proxy::run_proxy;
