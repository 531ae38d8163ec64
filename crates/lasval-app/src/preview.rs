//! File preview: decode the leading content and number its lines
//!
//! LAS files are conventionally written in windows-1251, so the raw bytes are
//! decoded with that encoding rather than as UTF-8.

use encoding_rs::WINDOWS_1251;

use lasval_core::prelude::*;

use crate::results::escape_html;

/// Number of lines shown by default
pub const PREVIEW_LINE_LIMIT: usize = 50;

/// LAS section marker (`~VERSION`, `~WELL`, `~CURVE`, `~ASCII`, ...)
pub const SECTION_MARKER: char = '~';

/// Shown instead of the preview when the bytes cannot be decoded
pub const DECODE_FAILURE_PLACEHOLDER: &str = "Unable to display file preview";

/// One numbered preview line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub number: usize,
    pub text: String,
    /// Line starts a LAS section and is rendered with emphasis
    pub is_section: bool,
}

impl PreviewLine {
    /// `"   7 | text"`
    pub fn formatted(&self) -> String {
        format!("{:>4} | {}", self.number, self.text)
    }
}

/// Rendered preview of a file's first lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub lines: Vec<PreviewLine>,
    /// Line count of the whole decoded file
    pub total_lines: usize,
    /// Set when decoding failed; `lines` is then empty
    pub placeholder: Option<String>,
}

impl Preview {
    pub fn unavailable(reason: &str) -> Self {
        debug!("Preview unavailable: {}", reason);
        Self {
            lines: Vec::new(),
            total_lines: 0,
            placeholder: Some(DECODE_FAILURE_PLACEHOLDER.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.placeholder.is_none()
    }

    pub fn is_truncated(&self) -> bool {
        self.total_lines > self.lines.len()
    }

    pub fn section_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_section).count()
    }

    /// Plain-text rendering, one formatted line per row
    pub fn to_text(&self) -> String {
        if let Some(placeholder) = &self.placeholder {
            return placeholder.clone();
        }
        self.lines
            .iter()
            .map(PreviewLine::formatted)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// HTML `<pre>` block with escaped content and emphasized section lines
    pub fn to_html(&self) -> String {
        if let Some(placeholder) = &self.placeholder {
            return format!(
                "<pre class=\"file-preview unavailable\">{}</pre>",
                escape_html(placeholder)
            );
        }

        let mut html = String::from("<pre class=\"file-preview\">");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                html.push('\n');
            }
            let formatted = escape_html(&line.formatted());
            if line.is_section {
                html.push_str("<span class=\"section\">");
                html.push_str(&formatted);
                html.push_str("</span>");
            } else {
                html.push_str(&formatted);
            }
        }
        if self.is_truncated() {
            html.push_str(&format!(
                "\n<span class=\"preview-more\">... {} more lines</span>",
                self.total_lines - self.lines.len()
            ));
        }
        html.push_str("</pre>");
        html
    }
}

/// Decode raw bytes as windows-1251.
///
/// Returns `Error::DecodeFailure` for binary content (NUL bytes) or a byte the
/// encoding does not map.
pub fn decode(raw: &[u8]) -> Result<String> {
    if raw.contains(&0) {
        return Err(Error::decode_failure("file contains binary data"));
    }
    WINDOWS_1251
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::decode_failure("content is not valid windows-1251"))
}

/// Decode `raw` and keep the first `limit` lines
pub fn render(raw: &[u8], limit: usize) -> Preview {
    let text = match decode(raw) {
        Ok(text) => text,
        Err(e) => return Preview::unavailable(&e.to_string()),
    };

    let mut total_lines = 0;
    let mut lines = Vec::with_capacity(limit.min(PREVIEW_LINE_LIMIT));
    for (index, line) in text.lines().enumerate() {
        total_lines += 1;
        if index < limit {
            lines.push(PreviewLine {
                number: index + 1,
                text: line.to_string(),
                is_section: line.trim_start().starts_with(SECTION_MARKER),
            });
        }
    }

    Preview {
        lines,
        total_lines,
        placeholder: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "~VERSION INFORMATION\n VERS.   2.0 : CWLS LOG ASCII STANDARD\n WRAP.   NO  : ONE LINE PER DEPTH STEP\n~WELL INFORMATION\n STRT.M  1670.0 : START DEPTH\n";

    #[test]
    fn test_line_numbers_right_aligned() {
        let preview = render(SAMPLE.as_bytes(), PREVIEW_LINE_LIMIT);
        assert_eq!(preview.lines[0].formatted(), "   1 | ~VERSION INFORMATION");
        assert_eq!(preview.lines.len(), 5);
        assert_eq!(preview.total_lines, 5);
        assert!(!preview.is_truncated());
    }

    #[test]
    fn test_section_lines_flagged() {
        let preview = render(SAMPLE.as_bytes(), PREVIEW_LINE_LIMIT);
        let flagged: Vec<usize> = preview
            .lines
            .iter()
            .filter(|l| l.is_section)
            .map(|l| l.number)
            .collect();
        assert_eq!(flagged, vec![1, 4]);
        assert_eq!(preview.section_count(), 2);
    }

    #[test]
    fn test_only_first_lines_rendered() {
        let content: String = (1..=120).map(|i| format!("{i}.0 1.0 2.0\n")).collect();
        let preview = render(content.as_bytes(), PREVIEW_LINE_LIMIT);

        assert_eq!(preview.lines.len(), 50);
        assert_eq!(preview.total_lines, 120);
        assert_eq!(preview.lines.last().unwrap().formatted(), "  50 | 50.0 1.0 2.0");
        assert!(preview.to_html().contains("70 more lines"));
    }

    #[test]
    fn test_decodes_windows_1251_not_utf8() {
        // "Скважина" in windows-1251
        let raw = [0xD1, 0xEA, 0xE2, 0xE0, 0xE6, 0xE8, 0xED, 0xE0];
        assert_eq!(decode(&raw).unwrap(), "Скважина");
    }

    #[test]
    fn test_binary_content_yields_placeholder() {
        let preview = render(&[b'~', b'V', 0x00, 0x01, b'\n'], PREVIEW_LINE_LIMIT);
        assert!(!preview.is_available());
        assert_eq!(preview.to_text(), DECODE_FAILURE_PLACEHOLDER);
        assert!(preview.to_html().contains("unavailable"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let preview = render(b"~A\r\nline\r\n", PREVIEW_LINE_LIMIT);
        assert_eq!(preview.lines[0].text, "~A");
        assert_eq!(preview.lines[1].text, "line");
    }

    #[test]
    fn test_html_escapes_and_emphasizes() {
        let preview = render(b"~W <tag>\nplain & more\n", PREVIEW_LINE_LIMIT);
        let html = preview.to_html();
        assert!(html.contains("<span class=\"section\">   1 | ~W &lt;tag&gt;</span>"));
        assert!(html.contains("   2 | plain &amp; more"));
    }

    #[test]
    fn test_empty_file() {
        let preview = render(b"", PREVIEW_LINE_LIMIT);
        assert!(preview.is_available());
        assert!(preview.lines.is_empty());
        assert_eq!(preview.to_text(), "");
    }
}
