//! Directory listing restricted to Markdown content.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// A file or directory entry for the listing API. `path` is slash-separated
/// and relative to the served root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

/// Check whether a file name has a Markdown extension (case-insensitive).
pub fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}

/// List the immediate children of `display_path` under `root`.
///
/// Subdirectories are always included; files only when Markdown. The result
/// is ordered directories first, then ascending byte-order by name.
pub fn list_directory(root: &Path, display_path: &str) -> io::Result<Vec<ListItem>> {
    let full_path = root.join(display_path);
    debug!("listing directory: {:?} (full path: {:?})", display_path, full_path);

    let mut items = Vec::new();
    for entry in fs::read_dir(&full_path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("failed to read directory entry: {}", err);
                continue;
            }
        };
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_dir && !is_markdown(&name) {
            continue;
        }
        let path = if display_path.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", display_path, name)
        };
        items.push(ListItem { name, path, is_dir });
    }

    items.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    debug!("listed {:?}, found {} entries", display_path, items.len());
    Ok(items)
}

/// Determine the content type for a static file from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}
