//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Workflow Errors
    // ─────────────────────────────────────────────────────────────
    /// Oversized file or wrong extension. No request is sent.
    #[error("{reason}")]
    InputRejected { reason: String },

    /// Preview could not be decoded. Cosmetic only.
    #[error("Preview unavailable: {message}")]
    DecodeFailure { message: String },

    /// The validation service answered with a non-success status.
    #[error("{message}")]
    ServerError { status: Option<u16>, message: String },

    /// The validation service could not be reached.
    #[error("Network error: {message}")]
    TransportError { message: String },

    #[error("No validation result to export")]
    ExportWithNoResult,

    #[error("Validation is already in progress")]
    SubmissionInFlight,

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    // ─────────────────────────────────────────────────────────────
    // Caching Proxy Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Cache store error: {message}")]
    CacheStore { message: String },

    #[error("Upstream request failed: {message}")]
    Upstream { message: String },

    #[error("Proxy install failed: {message}")]
    ProxyInstall { message: String },

    #[error("Failed to bind proxy listener on {addr}: {reason}")]
    ProxyBind { addr: String, reason: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn input_rejected(reason: impl Into<String>) -> Self {
        Self::InputRejected {
            reason: reason.into(),
        }
    }

    pub fn decode_failure(message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            message: message.into(),
        }
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn cache_store(message: impl Into<String>) -> Self {
        Self::CacheStore {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn proxy_install(message: impl Into<String>) -> Self {
        Self::ProxyInstall {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Every workflow error leaves the controller in a retryable state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InputRejected { .. }
                | Error::DecodeFailure { .. }
                | Error::ServerError { .. }
                | Error::TransportError { .. }
                | Error::ExportWithNoResult
                | Error::SubmissionInFlight
                | Error::Upstream { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigInvalid { .. } | Error::ProxyInstall { .. } | Error::ProxyBind { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
