use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use tracing::warn;

const MARKER: &str = "welcome-seen";

pub const PAGES: [(&str, &str); 4] = [
    (
        "Welcome to tunelink",
        "Collect songs from YouTube, Spotify, SoundCloud and more into playlists you can share.",
    ),
    (
        "Your feed",
        "See what the people you follow are listening to. Like with `l`, save with `s`, share with `S`.",
    ),
    (
        "Build playlists",
        "Press `n` in your library to start a playlist and `a` inside it to paste a link.",
    ),
    (
        "Play anywhere",
        "Audio links play right here. Everything else opens in its own player with `o`.",
    ),
];

/// First-run onboarding, remembered by a marker file in the data directory.
#[derive(Debug, Clone)]
pub struct WelcomeState {
    marker: PathBuf,
    seen: bool,
    page: usize,
}

impl WelcomeState {
    pub fn load(dir: &Path) -> Self {
        let marker = dir.join(MARKER);
        Self {
            seen: marker.exists(),
            marker,
            page: 0,
        }
    }

    pub fn should_show(&self) -> bool {
        !self.seen
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn current(&self) -> (&'static str, &'static str) {
        PAGES[self.page]
    }

    pub fn is_last(&self) -> bool {
        self.page + 1 >= PAGES.len()
    }

    /// Returns false once past the last page.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn back(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn mark_seen(&mut self) -> io::Result<()> {
        self.seen = true;
        if let Some(parent) = self.marker.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.marker, b"1").inspect_err(|e| {
            warn!(error = %e, path = %self.marker.display(), "welcome_marker_write_failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_once_per_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut welcome = WelcomeState::load(dir.path());
        assert!(welcome.should_show());

        while welcome.advance() {}
        assert!(welcome.is_last());
        welcome.mark_seen().unwrap();

        assert!(!WelcomeState::load(dir.path()).should_show());
    }

    #[test]
    fn paging_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut welcome = WelcomeState::load(dir.path());
        welcome.back();
        assert_eq!(welcome.page(), 0);
        for _ in 0..10 {
            welcome.advance();
        }
        assert_eq!(welcome.page(), PAGES.len() - 1);
    }
}
