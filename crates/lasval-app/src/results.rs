//! Results presenter: HTML fragments for a validation result
//!
//! Response text is only semi-trusted, so every message is escaped before it
//! is placed into markup.

use lasval_core::{Statistics, ValidationResult};

/// HTML fragments for one result, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedResults {
    pub summary: String,
    /// Numbered errors then warnings; only for failed validations
    pub details: Option<String>,
    pub info: Option<String>,
    pub statistics: Option<String>,
}

impl RenderedResults {
    pub fn to_html(&self) -> String {
        let mut html = String::from("<section class=\"results\">\n");
        html.push_str(&self.summary);
        for block in [&self.details, &self.info, &self.statistics]
            .into_iter()
            .flatten()
        {
            html.push('\n');
            html.push_str(block);
        }
        html.push_str("\n</section>");
        html
    }

    /// Standalone page around [`to_html`](Self::to_html)
    pub fn to_document(&self, file_name: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Validation results: {}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(file_name),
            self.to_html()
        )
    }
}

/// Render every block for `result`
pub fn render(result: &ValidationResult) -> RenderedResults {
    RenderedResults {
        summary: render_summary(result),
        details: render_details(result),
        info: render_info(&result.info),
        statistics: result.statistics.as_ref().and_then(render_statistics),
    }
}

/// Escape `&`, `<`, `>`, `"` and `'`
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_summary(result: &ValidationResult) -> String {
    let score = result
        .score()
        .map(|s| format!("<p class=\"score\">Score: {}/100</p>", s))
        .unwrap_or_default();

    if result.valid {
        let summary = result
            .summary
            .as_deref()
            .map(|s| format!("<p>{}</p>", escape_html(s)))
            .unwrap_or_default();
        format!(
            "<div class=\"result-summary success\"><h3>✓ File is valid</h3>{}{}</div>",
            summary, score
        )
    } else {
        format!(
            "<div class=\"result-summary error\"><h3>✗ Validation failed</h3>\
             <p>Errors: {}, warnings: {}</p>{}</div>",
            result.errors.len(),
            result.warnings.len(),
            score
        )
    }
}

fn render_details(result: &ValidationResult) -> Option<String> {
    if result.valid || !result.has_findings() {
        return None;
    }

    let mut html = String::from("<div class=\"result-details\">");
    if !result.errors.is_empty() {
        html.push_str("<h4>Errors</h4>");
        html.push_str(&numbered_list("error", &result.errors));
    }
    if !result.warnings.is_empty() {
        html.push_str("<h4>Warnings</h4>");
        html.push_str(&numbered_list("warning", &result.warnings));
    }
    html.push_str("</div>");
    Some(html)
}

fn numbered_list(kind: &str, entries: &[String]) -> String {
    let mut html = format!("<ol class=\"{}-list\">", kind);
    for (index, message) in entries.iter().enumerate() {
        html.push_str(&format!(
            "<li class=\"{}-item\"><span class=\"item-number\">{}.</span> {}</li>",
            kind,
            index + 1,
            escape_html(message)
        ));
    }
    html.push_str("</ol>");
    html
}

fn render_info(info: &[String]) -> Option<String> {
    if info.is_empty() {
        return None;
    }
    let items: String = info
        .iter()
        .map(|note| format!("<li>{}</li>", escape_html(note)))
        .collect();
    Some(format!(
        "<div class=\"result-info\"><h4>Information</h4><ul>{}</ul></div>",
        items
    ))
}

fn render_statistics(stats: &Statistics) -> Option<String> {
    let mut cards = Vec::new();
    if let Some(count) = stats.curve_count() {
        cards.push(stat_card("Curves", &count.to_string()));
    }
    if let Some(size) = stats.file_size_mb() {
        cards.push(stat_card("File size", &format!("{} MB", size)));
    }
    if cards.is_empty() {
        return None;
    }
    Some(format!(
        "<div class=\"result-statistics\">{}</div>",
        cards.concat()
    ))
}

fn stat_card(label: &str, value: &str) -> String {
    format!(
        "<div class=\"stat-card\"><span class=\"stat-value\">{}</span>\
         <span class=\"stat-label\">{}</span></div>",
        escape_html(value),
        label
    )
}
