//! Escaping and inline spans.
//!
//! Substitution only ever runs on text that [`escape_html`] has already
//! processed, so the tags inserted here are the only markup in the result.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Replace `&`, `<` and `>` with their entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// [`escape_html`] plus `"`, for values placed inside a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

/// Apply bold, italic, link and code spans, in that order, to escaped text.
pub fn apply_spans(escaped: &str) -> String {
    let s = BOLD.replace_all(escaped, "<strong>${1}</strong>");
    let s = ITALIC.replace_all(&s, "<em>${1}</em>");
    let s = LINK.replace_all(&s, |caps: &Captures| {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            link_href(&caps[2]),
            &caps[1]
        )
    });
    let s = CODE.replace_all(&s, "<code>${1}</code>");
    s.into_owned()
}

/// The URL as written, ready for a double-quoted attribute.
///
/// It was escaped with the rest of the line already, but bold and italic may
/// have matched inside it. Those tags go back to their markers, and backticks
/// are encoded so a later code span cannot open inside the attribute.
fn link_href(captured: &str) -> String {
    captured
        .replace("<strong>", "**")
        .replace("</strong>", "**")
        .replace("<em>", "*")
        .replace("</em>", "*")
        .replace('"', "&quot;")
        .replace('`', "&#96;")
}

/// Escape raw text, then apply inline spans.
pub fn render_inline(text: &str) -> String {
    apply_spans(&escape_html(text))
}
