//! mdview - serve a directory of Markdown files as a browsable site
//!
//! A local, single-binary HTTP server with a two-pane (tree + content) UI.
//! The core pipeline validates untrusted request paths against traversal
//! attacks, converts Markdown to sanitized HTML under a strict link-safety
//! policy, and exposes a JSON directory listing restricted to Markdown
//! files and subdirectories.

pub mod browser;
pub mod config;
pub mod errors;
pub mod filebrowser;
pub mod guard;
pub mod handlers;
pub mod logger;
pub mod render;
pub mod server;
pub mod templates;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::AppError;
pub use filebrowser::ListItem;
pub use render::MarkdownRenderer;
pub use server::{Server, build_router};
pub use types::{AppState, RenderedDocument};
