//! Safe Markdown rendering.
//!
//! Two-stage pipeline: pulldown-cmark with GFM-style extensions and a
//! link-safety policy applied to the event stream, then an ammonia
//! sanitization pass over the produced HTML. The link policy is a strict
//! allow-list: a destination renders as an anchor only when it is a relative
//! `.md`/`.markdown` path. Anything else is unwrapped entirely, so only the
//! link's inline text survives.

use std::ffi::OsStr;
use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use crate::types::RenderedDocument;

/// Classify a link destination. Safe iff it does not carry an
/// `http://`/`https://` scheme prefix and its lowercased extension is
/// `.md` or `.markdown`.
pub fn is_safe_link(destination: &str) -> bool {
    if destination.starts_with("http://") || destination.starts_with("https://") {
        return false;
    }
    matches!(
        Path::new(destination)
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("md") | Some("markdown")
    )
}

/// Markdown to sanitized HTML, with the link classification policy injected
/// at construction.
pub struct MarkdownRenderer {
    link_policy: fn(&str) -> bool,
}

impl MarkdownRenderer {
    pub fn new(link_policy: fn(&str) -> bool) -> Self {
        Self { link_policy }
    }

    /// Render Markdown source to a sanitized document. The title is always
    /// the supplied file base name, never derived from document content.
    pub fn render(&self, source: &str, file_name: &str) -> RenderedDocument {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let policy = self.link_policy;
        // Links cannot nest in Markdown, so a single flag is enough to pair
        // a suppressed start tag with its end tag.
        let mut suppressed = false;
        let events = Parser::new_ext(source, options).filter(move |event| match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                if policy(dest_url.as_ref()) {
                    true
                } else {
                    suppressed = true;
                    false
                }
            }
            Event::End(TagEnd::Link) => {
                if suppressed {
                    suppressed = false;
                    false
                } else {
                    true
                }
            }
            _ => true,
        });

        let mut output = String::new();
        html::push_html(&mut output, events);

        RenderedDocument {
            title: file_name.to_string(),
            html: sanitize(&output),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(is_safe_link)
    }
}

/// Sanitize rendered HTML with a user-generated-content allow-list. One
/// augmentation over the defaults: `class` is permitted on `<code>` when it
/// names a syntax-highlighting hint (`language-` plus word characters and
/// hyphens), and stripped otherwise.
fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tag_attributes("code", ["class"])
        .attribute_filter(|element, attribute, value| {
            if element == "code" && attribute == "class" && !is_language_class(value) {
                None
            } else {
                Some(value.into())
            }
        });
    builder.clean(html).to_string()
}

fn is_language_class(value: &str) -> bool {
    match value.strip_prefix("language-") {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        MarkdownRenderer::default().render(source, "test.md").html
    }

    #[test]
    fn link_safety_classification() {
        assert!(is_safe_link("sibling.md"));
        assert!(is_safe_link("docs/guide.markdown"));
        assert!(is_safe_link("UPPER.MD"));
        assert!(!is_safe_link("https://evil.com"));
        assert!(!is_safe_link("https://evil.com/readme.md"));
        assert!(!is_safe_link("http://example.org"));
        assert!(!is_safe_link("notes.txt"));
        assert!(!is_safe_link("image.png"));
        assert!(!is_safe_link("plain"));
    }

    #[test]
    fn safe_links_become_anchors() {
        let html = render("[local](sibling.md)");
        assert!(html.contains("href=\"sibling.md\""), "got: {html}");
        assert!(html.contains(">local</a>"), "got: {html}");
    }

    #[test]
    fn unsafe_links_are_unwrapped_not_defanged() {
        let html = render("[ext](https://evil.com)");
        assert!(!html.contains("<a"), "got: {html}");
        assert!(!html.contains("evil.com"), "got: {html}");
        assert!(html.contains("ext"), "got: {html}");
    }

    #[test]
    fn link_title_survives() {
        let html = render("[local](sibling.md \"the title\")");
        assert!(html.contains("title=\"the title\""), "got: {html}");
    }

    #[test]
    fn mixed_links_in_one_paragraph() {
        let html = render("[ext](https://evil.com) and [local](sibling.md)");
        assert!(html.contains("href=\"sibling.md\""), "got: {html}");
        assert!(!html.contains("evil.com"), "got: {html}");
        assert!(html.contains("ext and"), "got: {html}");
    }

    #[test]
    fn scripts_are_stripped() {
        let html = render("hello\n\n<script>alert(1)</script>\n");
        assert!(!html.contains("<script>"), "got: {html}");
        assert!(!html.contains("alert(1)"), "got: {html}");
    }

    #[test]
    fn event_handlers_are_stripped() {
        let html = render("<p onclick=\"evil()\">hi</p>");
        assert!(!html.contains("onclick"), "got: {html}");
        assert!(html.contains("hi"), "got: {html}");
    }

    #[test]
    fn language_class_preserved_on_code() {
        let html = render("```go\nfmt.Println(1)\n```\n");
        assert!(html.contains("class=\"language-go\""), "got: {html}");
    }

    #[test]
    fn non_language_class_stripped_from_code() {
        let html = render("<code class=\"onclick-evil\">x</code>");
        assert!(!html.contains("onclick-evil"), "got: {html}");
        assert!(html.contains("<code>"), "got: {html}");
    }

    #[test]
    fn language_class_pattern() {
        assert!(is_language_class("language-go"));
        assert!(is_language_class("language-objective-c"));
        assert!(is_language_class("language-c_sharp"));
        assert!(!is_language_class("language-"));
        assert!(!is_language_class("language-a b"));
        assert!(!is_language_class("onclick-evil"));
        assert!(!is_language_class("go"));
    }

    #[test]
    fn gfm_tables_render() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "got: {html}");
    }

    #[test]
    fn title_is_file_name_not_content() {
        let doc = MarkdownRenderer::default().render("# Injected <Title>", "a.md");
        assert_eq!(doc.title, "a.md");
    }
}
