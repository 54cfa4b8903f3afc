use std::io;

use tracing::{info, warn};

/// Hands a web link to the desktop's default browser without blocking the UI.
pub fn open_in_browser(url: &str) -> io::Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        warn!(url, "open_external_refused");
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "only web links can be opened",
        ));
    }

    info!(url, "open_external");
    open::that_detached(url).inspect_err(|e| warn!(url, error = %e, "open_external_failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_anything_but_web_links() {
        for url in ["file:///etc/passwd", "javascript:alert(1)", ""] {
            let err = open_in_browser(url).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
    }
}
