use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, PlaylistId, UserSummary, string_id};

string_id!(NotificationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Save,
    Follow,
    Share,
    NewPlaylist,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type", alias = "kind")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub actor: Option<UserSummary>,
    #[serde(default)]
    pub playlist_id: Option<PlaylistId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn text(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let who = self
            .actor
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("Someone");
        match self.kind {
            NotificationKind::Like => format!("{who} liked your playlist"),
            NotificationKind::Save => format!("{who} saved your playlist"),
            NotificationKind::Follow => format!("{who} started following you"),
            NotificationKind::Share => format!("{who} shared your playlist"),
            NotificationKind::NewPlaylist => format!("{who} published a new playlist"),
            NotificationKind::Unknown => format!("New activity from {who}"),
        }
    }
}

impl Identified for Notification {
    type Id = NotificationId;

    fn id(&self) -> NotificationId {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_do_not_fail_decoding() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "type": "comment_reaction",
            "actor": { "id": "u2", "username": "bo" }
        }))
        .unwrap();
        assert_eq!(n.kind, NotificationKind::Unknown);
        assert_eq!(n.text(), "New activity from bo");
        assert!(!n.is_read);
    }

    #[test]
    fn server_message_wins() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n2",
            "type": "like",
            "message": "bo liked Late night"
        }))
        .unwrap();
        assert_eq!(n.text(), "bo liked Late night");
    }
}
