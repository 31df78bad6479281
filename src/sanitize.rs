//! Full markdown to HTML, with raw HTML neutralized.
//!
//! This is the richer conversion used for `recommendationHtml`: the whole of
//! CommonMark plus tables, strikethrough and task lists, where any HTML the
//! text carries is shown as text and links open in a new tab.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::inline::escape_attr;

/// URL schemes allowed in link targets and image sources. Anything else
/// loses its `href` or `src`.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Convert markdown to HTML without passing through any raw HTML.
pub fn markdown_to_sanitized_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(markdown, options).map(sanitize_event);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        // Shown as text, escaped by the HTML writer
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),

        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => Event::InlineHtml(CowStr::from(open_link(&dest_url, &title))),
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),

        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => {
            log::debug!("dropping unsafe image source {:?}", dest_url);
            Event::Start(Tag::Image {
                link_type,
                dest_url: CowStr::Borrowed(""),
                title,
                id,
            })
        }

        other => other,
    }
}

fn open_link(url: &str, title: &str) -> String {
    let mut tag = String::from("<a");
    if is_safe_url(url) {
        tag.push_str(" href=\"");
        tag.push_str(&escape_attr(url));
        tag.push('"');
    } else {
        log::debug!("dropping unsafe link target {:?}", url);
    }
    if !title.is_empty() {
        tag.push_str(" title=\"");
        tag.push_str(&escape_attr(title));
        tag.push('"');
    }
    tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
    tag
}

/// Relative URLs, fragments and the [`SAFE_SCHEMES`] are allowed.
fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let Some(colon) = url.find(':') else {
        return true;
    };
    // A ':' after a path, query or fragment delimiter is not a scheme
    if url[..colon].contains(['/', '?', '#']) {
        return true;
    }
    let scheme = url[..colon].to_ascii_lowercase();
    SAFE_SCHEMES.contains(&scheme.as_str())
}
