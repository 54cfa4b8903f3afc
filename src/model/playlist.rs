use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, Song, UserSummary, string_id};

string_id!(PlaylistId);

const FALLBACK_GRADIENTS: [(&str, &str); 6] = [
    ("#1ed760", "#148a3e"),
    ("#ff6b9d", "#c44569"),
    ("#6a89cc", "#4a69bd"),
    ("#f8c291", "#e58e26"),
    ("#82ccdd", "#3c6382"),
    ("#b8e994", "#78e08f"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub from: String,
    pub to: String,
}

impl Gradient {
    /// Picks a stable gradient for playlists the server sent without one.
    pub fn fallback(id: &PlaylistId) -> Self {
        let hash = id
            .as_str()
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        let (from, to) = FALLBACK_GRADIENTS[hash % FALLBACK_GRADIENTS.len()];
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: UserSummary,
    /// Empty in list responses; only the detail endpoint embeds songs.
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub song_count: u32,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub saves_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub gradient: Option<Gradient>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_public() -> bool {
    true
}

impl Playlist {
    pub fn gradient(&self) -> Gradient {
        self.gradient
            .clone()
            .unwrap_or_else(|| Gradient::fallback(&self.id))
    }

    pub fn song_count(&self) -> u32 {
        if self.songs.is_empty() {
            self.song_count
        } else {
            self.songs.len() as u32
        }
    }

    pub fn is_owned_by(&self, user_id: Option<&super::UserId>) -> bool {
        user_id.is_some_and(|id| *id == self.owner.id)
    }
}

impl Identified for Playlist {
    type Id = PlaylistId;

    fn id(&self) -> PlaylistId {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistDraft {
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
}

impl Default for PlaylistDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            is_public: true,
        }
    }
}

impl PlaylistDraft {
    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            title: playlist.title.clone(),
            description: playlist.description.clone(),
            is_public: playlist.is_public,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_payload_decodes_with_defaults() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "title": "Late night",
            "owner": { "id": "u1", "username": "ana" },
            "song_count": 12,
            "likes_count": 3,
            "is_liked": true,
            "updated_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(playlist.id, PlaylistId::from("p1"));
        assert!(playlist.songs.is_empty());
        assert_eq!(playlist.song_count(), 12);
        assert!(playlist.is_public);
        assert!(playlist.is_liked);
        assert!(!playlist.is_saved);
        assert!(playlist.updated_at.is_some());
    }

    #[test]
    fn fallback_gradient_is_stable() {
        let id = PlaylistId::from("abc");
        assert_eq!(Gradient::fallback(&id), Gradient::fallback(&id));
    }

    #[test]
    fn draft_needs_a_title() {
        assert!(!PlaylistDraft::default().is_valid());
        let draft = PlaylistDraft {
            title: "  Roadtrip ".into(),
            ..Default::default()
        };
        assert!(draft.is_valid());
    }
}
