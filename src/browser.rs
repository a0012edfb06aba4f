use std::io;

/// Open the default web browser at the given URL. Only http/https URLs are
/// accepted so the launch can never be pointed at an arbitrary target.
pub fn open_browser(url: &str) -> io::Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "URL scheme must be http or https",
        ));
    }
    open::that_detached(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        assert!(open_browser("file:///etc/passwd").is_err());
        assert!(open_browser("javascript:alert(1)").is_err());
    }
}
