use std::io;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::templates;

/// Error taxonomy for the viewer. Every variant maps to a status code and
/// renders through the error page template, never a bare status line.
#[derive(Debug)]
pub enum AppError {
    MalformedUri,
    Traversal,
    NotFound,
    MethodNotAllowed,
    Io(io::Error),
    Template(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedUri => StatusCode::BAD_REQUEST,
            AppError::Traversal => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Io(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("internal error: {:?}", self);
        }
        (status, Html(templates::error_page(status))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::MalformedUri.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Traversal.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::Template("missing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
