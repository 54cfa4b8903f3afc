use serde::{Deserialize, Serialize};

use super::{Playlist, Song, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub has_more: bool,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, has_more: bool) -> Self {
        Self {
            items,
            page,
            has_more,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty() && self.users.is_empty() && self.songs.is_empty()
    }
}
