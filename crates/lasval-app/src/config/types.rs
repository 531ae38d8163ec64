//! Configuration types for the LAS validator
//!
//! Defines `Settings` (`.lasval/config.toml`) and its sections. Every section
//! falls back to its defaults when absent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings (.lasval/config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub upload: UploadSettings,

    #[serde(default)]
    pub progress: ProgressSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub proxy: ProxySettings,
}

/// Validation service location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Base URL; `/validate` and `/api/health` are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// File acceptance rules and preview size
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Required file name suffix, compared case-insensitively
    #[serde(default = "default_extension")]
    pub required_extension: String,

    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            required_extension: default_extension(),
            preview_lines: default_preview_lines(),
        }
    }
}

/// Synthetic progress model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressSettings {
    #[serde(default = "default_step_percent")]
    pub step_percent: u8,

    /// Highest value reached while waiting for the response
    #[serde(default = "default_ceiling_percent")]
    pub ceiling_percent: u8,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Delay between the response and revealing results
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            step_percent: default_step_percent(),
            ceiling_percent: default_ceiling_percent(),
            interval_ms: default_interval_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    #[serde(default = "default_notification_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_notification_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSettings {
    /// Where export artifacts are written
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

/// Caching proxy settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxySettings {
    #[serde(default = "default_proxy_listen")]
    pub listen: String,

    /// Origin serving the application shell and the validation API
    #[serde(default = "default_base_url")]
    pub upstream: String,

    /// Shell version; every shell change must ship under a new one
    #[serde(default = "default_proxy_version")]
    pub version: String,

    /// Cache store location; `None` = platform cache dir
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen: default_proxy_listen(),
            upstream: default_base_url(),
            version: default_proxy_version(),
            cache_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_extension() -> String {
    ".las".to_string()
}

fn default_preview_lines() -> usize {
    50
}

fn default_step_percent() -> u8 {
    10
}

fn default_ceiling_percent() -> u8 {
    90
}

fn default_interval_ms() -> u64 {
    200
}

fn default_settle_ms() -> u64 {
    500
}

fn default_notification_timeout_ms() -> u64 {
    5000
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_proxy_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_proxy_version() -> String {
    "v1".to_string()
}
