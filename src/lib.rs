mod block;
mod config;
mod error;
mod html;
mod inline;
mod parser;
mod sanitize;

pub mod ledger;
pub mod suggest;

pub use block::Block;
pub use config::{
    AlertsConfig, BudgetConfig, CONFIG_FILE_NAME, Config, GeneratorConfig, RecommendationConfig,
};
pub use error::{Error, Result};
pub use inline::{escape_html, render_inline};
pub use sanitize::markdown_to_sanitized_html;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert a recommendation written in the markdown subset to HTML.
///
/// Headings `#` to `####`, paragraphs and `-`/`*` bullet lists are
/// recognized, with bold, italic, link and inline code spans. All text is
/// HTML-escaped before spans are applied, so the input cannot inject markup.
/// Never fails: anything unrecognized becomes paragraph text.
pub fn render(markdown: &str) -> String {
    let blocks = parse(markdown);
    log::trace!("rendering {} blocks", blocks.len());
    html::blocks_to_html(&blocks)
}

/// HTML to display for a recommendation that may already be HTML.
///
/// Text whose first non-whitespace character is `<` is assumed to be
/// rendered already and is returned unchanged, without escaping. Only pass
/// text here that came from [`render`], [`markdown_to_sanitized_html`] or the
/// suggestion service.
pub fn to_display_html(text: &str) -> String {
    if text.trim_start().starts_with('<') {
        log::warn!("recommendation looks like HTML, passing it through unescaped");
        return text.to_string();
    }
    render(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_passes_html_through() {
        let html = "  <p>ya <em>listo</em></p>";
        assert_eq!(to_display_html(html), html);
    }

    #[test]
    fn display_renders_markdown() {
        assert_eq!(to_display_html("### Hola"), "<h3>Hola</h3>");
        assert_eq!(to_display_html("a < b"), "<p>a &lt; b</p>");
        assert_eq!(to_display_html(""), "");
    }
}
