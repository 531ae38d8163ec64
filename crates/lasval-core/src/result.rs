//! Validation service response model
//!
//! Entries in `errors`, `warnings` and `info` arrive either as bare strings or
//! as objects carrying a `message` field. They are normalized to plain strings
//! while deserializing, so everything downstream sees one representation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parsed body of a successful `POST /validate` response.
///
/// Immutable after receipt; shared read-only between the presenter and the
/// exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "deserialize_entries")]
    pub errors: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_entries")]
    pub warnings: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_entries")]
    pub info: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,

    /// Fields this client does not interpret (`score`, `error_count`, ...),
    /// kept so exports reproduce the received document.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValidationResult {
    /// A passing result with no findings
    pub fn passed(summary: impl Into<String>) -> Self {
        Self {
            valid: true,
            summary: Some(summary.into()),
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            statistics: None,
            extra: Map::new(),
        }
    }

    /// Parse a response body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Overall score reported by the service (0-100), if any
    pub fn score(&self) -> Option<i64> {
        self.extra.get("score").and_then(Value::as_i64)
    }

    pub fn has_findings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

/// Open statistics mapping with typed accessors for the known keys
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics(pub Map<String, Value>);

impl Statistics {
    pub fn curve_count(&self) -> Option<u64> {
        self.0.get("curve_count").and_then(Value::as_u64)
    }

    pub fn file_size_mb(&self) -> Option<f64> {
        self.0.get("file_size_mb").and_then(Value::as_f64)
    }

    pub fn file_size_bytes(&self) -> Option<u64> {
        self.0.get("file_size_bytes").and_then(Value::as_u64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Text(String),
    Object { message: String },
    Other(Value),
}

impl From<RawEntry> for String {
    fn from(entry: RawEntry) -> Self {
        match entry {
            RawEntry::Text(text) => text,
            RawEntry::Object { message } => message,
            RawEntry::Other(value) => value.to_string(),
        }
    }
}

/// Accepts a missing or `null` list as empty and flattens every entry to a string
fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawEntry>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}
