//! Path validation running ahead of all routing.
//!
//! Every inbound request passes through [`require_safe_path`] before any
//! handler sees it: the raw request path is percent-decoded, and any `..`
//! segment in the decoded path is rejected. Checking decoded segments (not a
//! raw substring search) catches encoded traversal attempts like `%2e%2e`
//! and redundant-slash tricks, and the check runs before any filesystem
//! join.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::errors::AppError;

/// Percent-decode a raw request path. A truncated or non-hex escape, or a
/// decode that is not valid UTF-8, is a malformed URI.
pub fn decode_path(raw: &str) -> Result<String, AppError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => return Err(AppError::MalformedUri),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| AppError::MalformedUri)
}

/// True if any slash-separated segment is exactly `..`.
pub fn has_dot_dot(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}

/// Validate a raw request path, returning the decoded path on success.
pub fn validate(raw_path: &str) -> Result<String, AppError> {
    let decoded = decode_path(raw_path)?;
    if has_dot_dot(&decoded) {
        return Err(AppError::Traversal);
    }
    Ok(decoded)
}

/// Lexically clean a relative display path: drop empty and `.` segments.
/// `..` segments are kept so callers can reject them via [`has_dot_dot`].
pub fn clean_relative(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Axum middleware applying [`validate`] to every request before routing.
pub async fn require_safe_path(req: Request, next: Next) -> Result<Response, AppError> {
    let raw = req.uri().path();
    match validate(raw) {
        Ok(_) => Ok(next.run(req).await),
        Err(AppError::MalformedUri) => {
            log::warn!("bad request: malformed URI: {:?}", req.uri());
            Err(AppError::MalformedUri)
        }
        Err(err) => {
            log::warn!("forbidden: traversal attempt in URI: {:?}", req.uri());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(decode_path("/a%20b").unwrap(), "/a b");
        assert_eq!(decode_path("/%2e%2e/x").unwrap(), "/../x");
        assert_eq!(decode_path("/plain/path").unwrap(), "/plain/path");
    }

    #[test]
    fn rejects_malformed_escapes() {
        assert!(matches!(decode_path("/a%zz"), Err(AppError::MalformedUri)));
        assert!(matches!(decode_path("/a%2"), Err(AppError::MalformedUri)));
        assert!(matches!(decode_path("/a%"), Err(AppError::MalformedUri)));
        // %ff alone is not valid UTF-8
        assert!(matches!(decode_path("/%ff"), Err(AppError::MalformedUri)));
    }

    #[test]
    fn detects_dot_dot_segments() {
        assert!(has_dot_dot("../etc/passwd"));
        assert!(has_dot_dot("/view/../secret"));
        assert!(has_dot_dot("a/b/.."));
        assert!(!has_dot_dot("/view/docs/a.md"));
        assert!(!has_dot_dot("..a/b"));
        assert!(!has_dot_dot("a../b"));
    }

    #[test]
    fn validate_rejects_encoded_traversal() {
        assert!(matches!(
            validate("/view/%2e%2e/%2e%2e/etc/passwd"),
            Err(AppError::Traversal)
        ));
        assert!(matches!(
            validate("/view/../../etc/passwd"),
            Err(AppError::Traversal)
        ));
        assert_eq!(validate("/view/docs/a.md").unwrap(), "/view/docs/a.md");
    }

    #[test]
    fn cleans_relative_paths() {
        assert_eq!(clean_relative("docs//sub/./a.md"), "docs/sub/a.md");
        assert_eq!(clean_relative("/docs/"), "docs");
        assert_eq!(clean_relative(""), "");
        // kept for the caller to reject
        assert_eq!(clean_relative("../x"), "../x");
    }
}
