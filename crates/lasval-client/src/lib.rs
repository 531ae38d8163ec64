//! lasval-client - HTTP client for the LAS validation service
//!
//! Wraps the two endpoints the client side knows about:
//! - `POST /validate` (multipart upload, see [`ValidationClient::validate`])
//! - `GET /api/health` (liveness probe, see [`ValidationClient::health`])
//!
//! Failures are classified at this boundary into
//! [`Error::ServerError`](lasval_core::Error::ServerError) (the service
//! answered with a non-success status) and
//! [`Error::TransportError`](lasval_core::Error::TransportError) (no response
//! at all).

pub mod client;
pub mod service;

pub use client::{HealthStatus, ValidationClient, GENERIC_SERVER_ERROR};
pub use service::{LocalValidationService, ValidationService};
