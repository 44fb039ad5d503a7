// src/normalizer/mod.rs
//! Cleans raw backend payloads into canonical HTML.
//!
//! Generation endpoints return model-produced HTML that is frequently
//! wrapped in a quote layer or a markdown code fence, occasionally preceded
//! by stray prose, and sometimes center-aligned inline. The pipeline here
//! strips the wrapping, repairs the leading tag and flattens centering so
//! the result is safe to embed, print or download.

mod style;

pub use style::AlignmentFix;

use std::sync::LazyLock;

use regex::Regex;

const FENCE: &str = "```";
const HTML_FENCE: &str = "```html";

/// Outcome of one normalization pass.
///
/// Never an error: garbage input produces best-effort output plus advisory
/// warnings describing where the pipeline had to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationResult {
    pub html: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// How inline `text-align: center` declarations are neutralized.
    pub alignment: AlignmentFix,
    /// Prepend the viewer stylesheet and wrap the content, for embedding
    /// in a preview surface. Applied at most once per payload.
    pub inject_viewer_styles: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            alignment: AlignmentFix::Replace,
            inject_viewer_styles: false,
        }
    }
}

/// Normalize with default options: in-place alignment rewrite, no viewer
/// stylesheet.
pub fn normalize(raw: &str) -> SanitizationResult {
    normalize_with(raw, &NormalizeOptions::default())
}

/// Full pipeline: quote layer, code fences, trim, leading-tag repair,
/// center-alignment neutralization, optional viewer stylesheet.
pub fn normalize_with(raw: &str, options: &NormalizeOptions) -> SanitizationResult {
    let mut warnings = Vec::new();

    let text = strip_quote_layer(raw);
    let text = strip_code_fences(text, &mut warnings);
    let text = text.trim();
    let text = repair_leading_tag(text, &mut warnings);

    let html = style::neutralize_centering(text, options.alignment);
    let html = if options.inject_viewer_styles {
        inject_viewer_styles(&html)
    } else {
        html
    };

    SanitizationResult { html, warnings }
}

/// Remove exactly one layer of matching surrounding quotes, double quotes
/// taking precedence. Never recursive.
fn strip_quote_layer(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Substring-based fence removal, not a markdown parser: the first opener
/// and the last closer delimit the extracted span. An opener without a
/// closer after it leaves the text unchanged and records a warning.
fn strip_code_fences<'a>(text: &'a str, warnings: &mut Vec<String>) -> &'a str {
    if let Some(open) = text.find(HTML_FENCE) {
        let start = open + HTML_FENCE.len();
        match text.rfind(FENCE) {
            Some(end) if end > start => return &text[start..end],
            _ => warnings.push("unterminated ```html fence left in place".to_string()),
        }
        return text;
    }

    if text.starts_with(FENCE) {
        let start = FENCE.len();
        match text.rfind(FENCE) {
            Some(end) if end > start => return &text[start..end],
            _ => warnings.push("unterminated ``` fence left in place".to_string()),
        }
    }

    text
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("TAG_RE: hardcoded regex is statically valid"));

/// Cut leading non-HTML content so the payload starts at its first tag.
/// A payload with no tags at all is passed through untouched.
fn repair_leading_tag<'a>(text: &'a str, warnings: &mut Vec<String>) -> &'a str {
    if text.is_empty() || text.starts_with('<') {
        return text;
    }

    match TAG_RE.find(text) {
        Some(tag) => {
            warnings.push(format!(
                "discarded {} bytes of leading non-HTML content",
                tag.start()
            ));
            &text[tag.start()..]
        }
        None => {
            warnings.push("payload contains no HTML tags, left unchanged".to_string());
            text
        }
    }
}

/// Class the viewer stylesheet scopes its rules to.
pub const VIEWER_WRAPPER_CLASS: &str = "document-viewer";

/// Fixed rules prepended ahead of the content in viewer mode: left
/// alignment wins over any inline centering the rewrite pass missed,
/// list markers stay visible, and sizing is predictable.
pub const VIEWER_STYLESHEET: &str = r#"<style data-viewer-reset>
.document-viewer, .document-viewer * { box-sizing: border-box; }
.document-viewer, .document-viewer * { text-align: left !important; }
.document-viewer ul { list-style: disc outside; padding-left: 1.5em; }
.document-viewer ol { list-style: decimal outside; padding-left: 1.5em; }
</style>"#;

fn inject_viewer_styles(html: &str) -> String {
    // The stylesheet is only ever prepended at offset zero, so a prefix
    // check is enough to keep the step single-shot.
    if html.starts_with("<style data-viewer-reset>") {
        return html.to_string();
    }
    format!("{VIEWER_STYLESHEET}\n<div class=\"{VIEWER_WRAPPER_CLASS}\">\n{html}\n</div>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_layer_of_double_quotes() {
        let result = normalize("\"<p>hi</p>\"");
        assert_eq!(result.html, "<p>hi</p>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn strips_one_layer_of_single_quotes() {
        let result = normalize("'<p>hi</p>'");
        assert_eq!(result.html, "<p>hi</p>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn quote_stripping_is_not_recursive() {
        assert_eq!(strip_quote_layer("\"\"<p>hi</p>\"\""), "\"<p>hi</p>\"");
    }

    #[test]
    fn double_quotes_take_precedence_over_single() {
        // Only one layer comes off even when both kinds wrap the payload.
        assert_eq!(strip_quote_layer("\"'<p>hi</p>'\""), "'<p>hi</p>'");
    }

    #[test]
    fn lone_quote_is_not_a_pair() {
        assert_eq!(strip_quote_layer("\""), "\"");
    }

    #[test]
    fn strips_html_tagged_fence() {
        let result = normalize("```html\n<p>hi</p>\n```");
        assert_eq!(result.html, "<p>hi</p>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn strips_bare_fence() {
        let result = normalize("```\n<div>x</div>\n```");
        assert_eq!(result.html, "<div>x</div>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn html_fence_opener_may_appear_mid_text() {
        let result = normalize("Here you go:\n```html\n<p>hi</p>\n```");
        assert_eq!(result.html, "<p>hi</p>");
    }

    #[test]
    fn multiple_fences_use_the_last_closer() {
        // First opener, last closer: everything in between survives, inner
        // fences included. Deliberately mirrors the backend's behavior.
        let result = normalize("```html\n<p>a</p>\n```\n<p>b</p>\n```");
        assert_eq!(result.html, "<p>a</p>\n```\n<p>b</p>");
    }

    #[test]
    fn unterminated_html_fence_is_left_in_place() {
        let mut warnings = Vec::new();
        let text = strip_code_fences("```html\n<p>hi</p>", &mut warnings);
        assert_eq!(text, "```html\n<p>hi</p>");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn unterminated_bare_fence_is_left_in_place() {
        let mut warnings = Vec::new();
        let text = strip_code_fences("```\n<p>hi</p>", &mut warnings);
        assert_eq!(text, "```\n<p>hi</p>");
        assert!(!warnings.is_empty());
    }

    #[test]
    fn leading_tag_repair_recovers_after_an_unterminated_fence() {
        let result = normalize("```html\n<p>hi</p>");
        assert_eq!(result.html, "<p>hi</p>");
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn repairs_missing_leading_tag() {
        let result = normalize("junk<p>ok</p>");
        assert_eq!(result.html, "<p>ok</p>");
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn payload_without_tags_passes_through() {
        let result = normalize("plain text, no tags");
        assert_eq!(result.html, "plain text, no tags");
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let result = normalize("  \n<p>hi</p>\n  ");
        assert_eq!(result.html, "<p>hi</p>");
    }

    #[test]
    fn rewrites_centered_inline_style() {
        let result = normalize("<li style=\"text-align: center;\">X</li>");
        assert!(!result.html.contains("text-align: center"));
        assert!(result.html.contains(">X</li>"));
    }

    #[test]
    fn combined_quotes_fence_and_centering() {
        let raw = "\"```html\n<ul><li style=\"text-align:center\">A</li></ul>\n```\"";
        let result = normalize(raw);
        assert_eq!(
            result.html,
            "<ul><li style=\"text-align: left\">A</li></ul>"
        );
    }

    #[test]
    fn clean_input_is_a_fixed_point() {
        let clean = "<div><p style=\"color: red\">hello</p><ul><li>a</li></ul></div>";
        let once = normalize(clean);
        let twice = normalize(&once.html);
        assert_eq!(once.html, clean);
        assert_eq!(twice.html, once.html);
        assert!(twice.warnings.is_empty());
    }

    #[test]
    fn replace_mode_is_idempotent() {
        let once = normalize("<p style=\"text-align: center\">t</p>");
        let twice = normalize(&once.html);
        assert_eq!(twice.html, once.html);
    }

    #[test]
    fn important_mode_is_idempotent() {
        let options = NormalizeOptions {
            alignment: AlignmentFix::Important,
            ..Default::default()
        };
        let once = normalize_with("<p style=\"text-align: center\">t</p>", &options);
        let twice = normalize_with(&once.html, &options);
        assert!(once.html.contains("text-align: left !important"));
        assert_eq!(twice.html, once.html);
    }

    #[test]
    fn viewer_styles_are_injected_once() {
        let options = NormalizeOptions {
            inject_viewer_styles: true,
            ..Default::default()
        };
        let once = normalize_with("<p>hi</p>", &options);
        let twice = normalize_with(&once.html, &options);
        assert!(once.html.starts_with("<style data-viewer-reset>"));
        assert!(once.html.contains(VIEWER_WRAPPER_CLASS));
        assert_eq!(twice.html, once.html);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = normalize("");
        assert_eq!(result.html, "");
    }
}
