//! lasval-app - Validation workflow state and orchestration
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the
//! selection → preview → submission → results → export workflow, the Engine
//! that owns the message channel, configuration loading, and the pure
//! presenters (preview, results, export) the handlers call into.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod export;
pub mod handler;
pub mod message;
pub mod notifications;
pub mod preview;
pub mod process;
pub mod progress;
pub mod results;
pub mod selection;
pub mod state;
pub mod workflow;

// Re-export primary types
pub use actions::ActionContext;
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::{FailureKind, Message, SubmitFailure};
pub use notifications::{Notification, NotificationCenter, NotificationId};
pub use state::AppState;
pub use config::{load_settings, Settings};
pub use workflow::{Phase, Workflow};
