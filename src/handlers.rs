use std::ffi::OsStr;

use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::filebrowser;
use crate::guard;
use crate::types::AppState;
use crate::utils::escape_html;

/// Handle the root shell page
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render("index.html", &[])?))
}

/// Handle the welcome page
pub async fn handle_welcome(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render("welcome.html", &[])?))
}

/// Handle the tree-navigator shell
pub async fn handle_tree(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render("treeview.html", &[])?))
}

/// Render a Markdown file under the served root as sanitized HTML
pub async fn handle_view(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Html<String>, AppError> {
    let display_path = guard::clean_relative(&path);
    let full_path = state.root_dir.join(&display_path);
    log::info!("view request: '{}'", display_path);

    let source = std::fs::read(&full_path).map_err(|err| {
        log::warn!("markdown source unreadable: {:?}: {}", full_path, err);
        AppError::NotFound
    })?;
    let source = String::from_utf8_lossy(&source);

    let file_name = full_path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or(display_path.as_str())
        .to_string();
    let document = state.renderer.render(&source, &file_name);

    let page = state.templates.render(
        "markdown.html",
        &[
            ("TITLE", escape_html(&document.title).as_str()),
            ("CONTENT", document.html.as_str()),
        ],
    )?;
    Ok(Html(page))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    path: String,
}

/// JSON listing of Markdown files and subdirectories
pub async fn handle_api_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let display_path = guard::clean_relative(&query.path);
    // The guard middleware only sees the URI path, so the query parameter
    // gets the same segment check here.
    if guard::has_dot_dot(&display_path) {
        log::warn!("forbidden: traversal attempt in list query: {:?}", query.path);
        return Err(AppError::Traversal);
    }

    match filebrowser::list_directory(&state.root_dir, &display_path) {
        Ok(items) => Ok(Json(items).into_response()),
        Err(err) => {
            log::warn!("listing failed for '{}': {}", display_path, err);
            Ok((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Directory not found"})),
            )
                .into_response())
        }
    }
}

/// Acknowledge and trigger graceful shutdown
pub async fn handle_shutdown(State(state): State<AppState>) -> impl IntoResponse {
    log::info!("shutdown requested via API");
    let _ = state.shutdown.try_send(());
    (
        StatusCode::OK,
        "Shutdown signal received. Server is shutting down.\n",
    )
}

/// Serve a static asset from the on-disk static directory
pub async fn handle_static(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, AppError> {
    let relative = guard::clean_relative(&path);
    let full_path = state.static_dir.join(&relative);
    let bytes = std::fs::read(&full_path).map_err(|_| AppError::NotFound)?;
    let content_type = filebrowser::content_type_for(&full_path);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Fallback for unmatched routes
pub async fn handle_not_found() -> AppError {
    AppError::NotFound
}

/// Fallback for unmatched methods on method-restricted routes
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
