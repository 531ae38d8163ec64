//! Export of the last validation result as a downloadable artifact

use chrono::{DateTime, Utc};

use lasval_core::prelude::*;
use lasval_core::{ExportFormat, ValidationResult};

pub const STATUS_VALID: &str = "VALID";
pub const STATUS_INVALID: &str = "INVALID";

const REPORT_HEADER: &str = "LAS FILE VALIDATION REPORT";

/// A serialized result ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Build the artifact for `result` of the file named `original_name`
pub fn export(
    result: &ValidationResult,
    original_name: &str,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<ExportArtifact> {
    let body = match format {
        ExportFormat::Json => to_json(result)?,
        ExportFormat::Text => to_text(result, original_name, now),
    };

    Ok(ExportArtifact {
        file_name: artifact_name(original_name, now.timestamp_millis(), format),
        content_type: format.content_type(),
        body,
    })
}

/// `validation_<originalFileName>_<epochMillis>.<ext>`
pub fn artifact_name(original_name: &str, epoch_ms: i64, format: ExportFormat) -> String {
    format!(
        "validation_{}_{}.{}",
        original_name,
        epoch_ms,
        format.extension()
    )
}

/// Pretty-printed (2-space indent) serialization of the result
pub fn to_json(result: &ValidationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn status_token(result: &ValidationResult) -> &'static str {
    if result.valid {
        STATUS_VALID
    } else {
        STATUS_INVALID
    }
}

/// Fixed plain-text transcript of the result
pub fn to_text(result: &ValidationResult, original_name: &str, exported_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        REPORT_HEADER.to_string(),
        "=".repeat(REPORT_HEADER.len()),
        format!("File: {}", original_name),
        format!("Exported: {}", exported_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Status: {}", status_token(result)),
    ];

    if let Some(summary) = &result.summary {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.push(summary.clone());
    }

    if !result.errors.is_empty() {
        lines.push(String::new());
        lines.push(format!("Errors ({}):", result.errors.len()));
        lines.extend(
            result
                .errors
                .iter()
                .enumerate()
                .map(|(i, e)| format!("  {}. {}", i + 1, e)),
        );
    }

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings ({}):", result.warnings.len()));
        lines.extend(
            result
                .warnings
                .iter()
                .enumerate()
                .map(|(i, w)| format!("  {}. {}", i + 1, w)),
        );
    }

    if !result.info.is_empty() {
        lines.push(String::new());
        lines.push("Info:".to_string());
        lines.extend(result.info.iter().map(|note| format!("  • {}", note)));
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap()
    }

    fn sample_result() -> ValidationResult {
        serde_json::from_value(json!({
            "valid": false,
            "summary": "Errors found: 2, warnings: 1. Score: 78/100",
            "errors": ["Missing ~VERSION section", {"message": "NULL value not declared"}],
            "warnings": ["Blank line in ~WELL"],
            "info": ["Wrap mode: NO"],
            "statistics": {"curve_count": 4, "file_size_mb": 0.02},
            "score": 78,
            "error_count": {"critical": 0, "error": 2, "warning": 1}
        }))
        .unwrap()
    }

    #[test]
    fn test_json_export_round_trips() {
        let result = sample_result();
        let artifact = export(&result, "well.las", ExportFormat::Json, fixed_now()).unwrap();

        let parsed: ValidationResult = serde_json::from_str(&artifact.body).unwrap();
        assert_eq!(parsed, result);
        assert_eq!(artifact.content_type, "application/json");
        assert!(artifact.body.contains("\n  \"valid\": false"));
    }

    #[test]
    fn test_text_export_contains_name_and_status() {
        let result = sample_result();
        let text = to_text(&result, "well.las", fixed_now());

        assert!(text.starts_with(REPORT_HEADER));
        assert!(text.contains("File: well.las"));
        assert!(text.contains("Status: INVALID"));
        assert!(text.contains("Exported: 2026-10-19 12:30:00 UTC"));
        assert!(text.contains("  1. Missing ~VERSION section"));
        assert!(text.contains("  2. NULL value not declared"));
        assert!(text.contains("Warnings (1):\n  1. Blank line in ~WELL"));
        assert!(text.contains("  • Wrap mode: NO"));
    }

    #[test]
    fn test_text_export_valid_status_without_sections() {
        let result = ValidationResult::passed("All good");
        let text = to_text(&result, "ok.las", fixed_now());

        assert!(text.contains("Status: VALID"));
        assert!(!text.contains("Errors ("));
        assert!(!text.contains("Warnings ("));
        assert!(!text.contains("Info:"));
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            artifact_name("well.las", 1_700_000_000_123, ExportFormat::Text),
            "validation_well.las_1700000000123.txt"
        );
        let artifact = export(
            &ValidationResult::passed("x"),
            "a.las",
            ExportFormat::Json,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(
            artifact.file_name,
            format!("validation_a.las_{}.json", fixed_now().timestamp_millis())
        );
    }
}
