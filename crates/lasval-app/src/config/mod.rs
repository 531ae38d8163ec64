//! Configuration file parsing for the LAS validator
//!
//! Supports:
//! - `.lasval/config.toml` - Global settings

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings, validate_settings};
pub use types::*;
