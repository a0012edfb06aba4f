use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::render::MarkdownRenderer;
use crate::templates::TemplateCache;

/// Application state shared across all handlers. Built once at server
/// construction; nothing here is mutated during request handling. The
/// shutdown sender is the only write path and it is one-shot in effect.
#[derive(Clone)]
pub struct AppState {
    /// Absolute content root all relative paths resolve against.
    pub root_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
    pub templates: Arc<TemplateCache>,
    pub renderer: Arc<MarkdownRenderer>,
    pub shutdown: mpsc::Sender<()>,
}

/// Rendered Markdown document, produced per request and never cached.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub title: String,
    pub html: String,
}
