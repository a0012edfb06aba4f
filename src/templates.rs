//! Page template cache.
//!
//! Templates are embedded at compile time and may be overridden by files of
//! the same name in a `templates/` directory, read once at startup. The
//! cache is immutable after construction, so concurrent readers need no
//! synchronization. Substitution is plain `{{NAME}}` placeholder
//! replacement.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use axum::http::StatusCode;

use crate::errors::AppError;

const EMBEDDED: [(&str, &str); 5] = [
    ("index.html", include_str!("../templates/index.html")),
    ("welcome.html", include_str!("../templates/welcome.html")),
    ("treeview.html", include_str!("../templates/treeview.html")),
    ("markdown.html", include_str!("../templates/markdown.html")),
    ("error.html", include_str!("../templates/error.html")),
];

const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

pub struct TemplateCache {
    pages: HashMap<&'static str, String>,
}

impl TemplateCache {
    /// Build the cache, preferring on-disk overrides from `dir`. A missing
    /// file falls back to the embedded copy; any other read error is a
    /// startup failure.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let mut pages = HashMap::new();
        for (name, embedded) in EMBEDDED {
            match fs::read_to_string(dir.join(name)) {
                Ok(source) => {
                    log::debug!("loaded template override: {}", name);
                    pages.insert(name, source);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    pages.insert(name, embedded.to_string());
                }
                Err(err) => return Err(AppError::Io(err)),
            }
        }
        Ok(Self { pages })
    }

    /// Render a template by name, substituting `{{KEY}}` placeholders.
    pub fn render(&self, name: &str, values: &[(&str, &str)]) -> Result<String, AppError> {
        let template = self
            .pages
            .get(name)
            .ok_or_else(|| AppError::Template(format!("template not found: {name}")))?;
        let mut html = template.clone();
        for (key, value) in values {
            html = html.replace(&format!("{{{{{key}}}}}"), value);
        }
        Ok(html)
    }
}

/// Render the error page for a status code. Always uses the embedded
/// template so error rendering itself cannot fail.
pub fn error_page(status: StatusCode) -> String {
    let text = status.canonical_reason().unwrap_or("Error");
    ERROR_TEMPLATE
        .replace("{{STATUS_CODE}}", status.as_str())
        .replace("{{STATUS_TEXT}}", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn falls_back_to_embedded_templates() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::load(dir.path()).unwrap();
        let page = cache
            .render("markdown.html", &[("TITLE", "a.md"), ("CONTENT", "<p>hi</p>")])
            .unwrap();
        assert!(page.contains("a.md"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn disk_override_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("welcome.html"), "<h1>custom</h1>").unwrap();
        let cache = TemplateCache::load(dir.path()).unwrap();
        assert_eq!(cache.render("welcome.html", &[]).unwrap(), "<h1>custom</h1>");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = TemplateCache::load(dir.path()).unwrap();
        assert!(matches!(
            cache.render("missing.html", &[]),
            Err(AppError::Template(_))
        ));
    }

    #[test]
    fn error_page_carries_status() {
        let page = error_page(StatusCode::NOT_FOUND);
        assert!(page.contains("404"));
        assert!(page.contains("Not Found"));
    }
}
