pub mod cache;
pub mod optimistic;
pub mod pager;

use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{
    Notification, NotificationId, Page, Playlist, PlaylistId, SearchResults, User, UserId,
};

pub use cache::{Freshness, PlaylistCache};
pub use optimistic::{Confirmation, Mutation, Pending};
pub use pager::Pager;

const TOAST_LIFETIME: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub data: AppData,
    pub ui: UiState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Unknown,
    Checking,
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub status: AuthStatus,
}

#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub auth: AuthState,
    pub playlists: HashMap<PlaylistId, Playlist>,
    pub users: HashMap<UserId, User>,
    pub cache: PlaylistCache,
    pub mine: Vec<PlaylistId>,
    pub saved: Vec<PlaylistId>,
    pub feed: Pager<PlaylistId>,
    pub discover: Pager<PlaylistId>,
    pub notifications: Pager<Notification>,
    pub unread_count: u32,
    pub search: Option<SearchResults>,
    pub(crate) in_flight: HashSet<optimistic::MutationKey>,
}

impl AppData {
    pub fn with_cache_ttl(ttl: Duration) -> Self {
        Self {
            cache: PlaylistCache::new(ttl),
            ..Self::default()
        }
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        self.auth.user.as_ref().map(|u| &u.id)
    }

    pub fn sign_in(&mut self, user: User) {
        self.users.insert(user.id.clone(), user.clone());
        self.auth = AuthState {
            user: Some(user),
            status: AuthStatus::SignedIn,
        };
    }

    /// Drops everything tied to the previous account.
    pub fn sign_out(&mut self) {
        let mut cache = std::mem::take(&mut self.cache);
        cache.clear();
        *self = Self {
            cache,
            ..Self::default()
        };
        self.auth.status = AuthStatus::SignedOut;
    }

    pub fn playlist(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.get(id)
    }

    pub fn playlist_mut(&mut self, id: &PlaylistId) -> Option<&mut Playlist> {
        self.playlists.get_mut(id)
    }

    pub fn resolve<'a>(&'a self, ids: impl IntoIterator<Item = &'a PlaylistId>) -> Vec<&'a Playlist> {
        ids.into_iter().filter_map(|id| self.playlists.get(id)).collect()
    }

    /// Merges a playlist from any listing. A summary without songs never
    /// erases songs we already hold.
    pub fn upsert_playlist(&mut self, mut incoming: Playlist) -> PlaylistId {
        let id = incoming.id.clone();
        if let Some(existing) = self.playlists.get_mut(&id) {
            if incoming.songs.is_empty() && !existing.songs.is_empty() {
                incoming.songs = std::mem::take(&mut existing.songs);
            }
            *existing = incoming;
        } else {
            self.playlists.insert(id.clone(), incoming);
        }
        id
    }

    /// Stores a full playlist (with songs) and records it in the cache.
    pub fn store_playlist_detail(&mut self, playlist: Playlist, now: DateTime<Utc>) {
        let updated_at = playlist.updated_at;
        let id = playlist.id.clone();
        self.playlists.insert(id.clone(), playlist);
        self.cache.record(id, updated_at, now);
    }

    pub fn playlist_freshness(&self, id: &PlaylistId, now: DateTime<Utc>) -> Freshness {
        let remote = self.playlists.get(id).and_then(|p| p.updated_at);
        self.cache.freshness(id, remote, now)
    }

    pub fn remove_playlist(&mut self, id: &PlaylistId) {
        self.playlists.remove(id);
        self.mine.retain(|p| p != id);
        self.saved.retain(|p| p != id);
        self.feed.remove(id);
        self.discover.remove(id);
        self.cache.invalidate(id);
    }

    pub fn set_mine(&mut self, playlists: Vec<Playlist>) {
        self.mine = playlists
            .into_iter()
            .map(|p| self.upsert_playlist(p))
            .collect();
    }

    pub fn set_saved(&mut self, playlists: Vec<Playlist>) {
        self.saved = playlists
            .into_iter()
            .map(|p| self.upsert_playlist(p))
            .collect();
    }

    pub fn add_mine(&mut self, playlist: Playlist) {
        let id = self.upsert_playlist(playlist);
        self.mine.retain(|p| *p != id);
        self.mine.insert(0, id);
    }

    pub fn append_feed(&mut self, page: Page<Playlist>) -> usize {
        let ids = self.ingest_page(page);
        self.feed.append(ids)
    }

    pub fn append_discover(&mut self, page: Page<Playlist>) -> usize {
        let ids = self.ingest_page(page);
        self.discover.append(ids)
    }

    fn ingest_page(&mut self, page: Page<Playlist>) -> Page<PlaylistId> {
        let Page {
            items,
            page,
            has_more,
        } = page;
        let ids = items.into_iter().map(|p| self.upsert_playlist(p)).collect();
        Page::new(ids, page, has_more)
    }

    pub fn set_search_results(&mut self, results: SearchResults) {
        for playlist in &results.playlists {
            self.upsert_playlist(playlist.clone());
        }
        for user in &results.users {
            self.users.insert(user.id.clone(), user.clone());
        }
        self.search = Some(results);
    }

    pub fn mark_notification_read(&mut self, id: &NotificationId) -> bool {
        let Some(notification) = self.notifications.iter_mut().find(|n| n.id == *id) else {
            return false;
        };
        if notification.is_read {
            return false;
        }
        notification.is_read = true;
        self.unread_count = self.unread_count.saturating_sub(1);
        true
    }

    /// Undoes [`mark_notification_read`](Self::mark_notification_read) after
    /// the server refused it.
    pub fn mark_notification_unread(&mut self, id: &NotificationId) -> bool {
        let Some(notification) = self.notifications.iter_mut().find(|n| n.id == *id) else {
            return false;
        };
        if !notification.is_read {
            return false;
        }
        notification.is_read = false;
        self.unread_count = self.unread_count.saturating_add(1);
        true
    }

    pub fn mark_all_notifications_read(&mut self) -> ReadReceipt {
        let mut ids = Vec::new();
        for notification in self.notifications.iter_mut() {
            if !notification.is_read {
                notification.is_read = true;
                ids.push(notification.id.clone());
            }
        }
        let unread_count = std::mem::take(&mut self.unread_count);
        ReadReceipt { ids, unread_count }
    }

    /// Puts back what a rejected mark-all-read changed.
    pub fn restore_read_receipt(&mut self, receipt: ReadReceipt) {
        for notification in self.notifications.iter_mut() {
            if receipt.ids.contains(&notification.id) {
                notification.is_read = false;
            }
        }
        self.unread_count = receipt.unread_count;
    }
}

/// What mark-all-read changed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub ids: Vec<NotificationId>,
    pub unread_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub sidebar_index: usize,
    pub toasts: VecDeque<Toast>,
}

impl UiState {
    pub fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push_back(Toast {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Instant::now(),
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.toast(ToastLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.toast(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.toast(ToastLevel::Error, message);
    }

    /// Returns true when something was dropped and a redraw is due.
    pub fn expire_toasts(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < TOAST_LIFETIME);
        before != self.toasts.len()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{Playlist, PlaylistId, Song, SongId, UserSummary};

    pub fn song(id: &str) -> Song {
        Song {
            id: SongId::from(id),
            title: format!("Song {id}"),
            artist: Some("Artist".into()),
            url: format!("https://youtu.be/{id}"),
            platform: None,
            thumbnail_url: None,
            duration_secs: Some(200),
            added_at: None,
        }
    }

    pub fn playlist(id: &str, songs: &[&str]) -> Playlist {
        Playlist {
            id: PlaylistId::from(id),
            title: format!("Playlist {id}"),
            description: None,
            owner: UserSummary {
                id: "owner".into(),
                username: "owner".into(),
                avatar_url: None,
            },
            songs: songs.iter().map(|s| song(s)).collect(),
            song_count: songs.len() as u32,
            likes_count: 5,
            saves_count: 2,
            is_liked: false,
            is_saved: false,
            is_public: true,
            gradient: None,
            thumbnail_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::playlist;
    use super::*;
    use crate::model::NotificationKind;

    #[test]
    fn summary_upsert_keeps_cached_songs() {
        let mut data = AppData::default();
        data.store_playlist_detail(playlist("p", &["a", "b"]), Utc::now());

        let mut summary = playlist("p", &[]);
        summary.title = "Renamed".into();
        summary.song_count = 2;
        data.upsert_playlist(summary);

        let stored = data.playlist(&"p".into()).unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.songs.len(), 2);
    }

    #[test]
    fn listing_with_newer_timestamp_invalidates_detail() {
        let mut data = AppData::default();
        let now = Utc::now();
        let mut detail = playlist("p", &["a"]);
        detail.updated_at = Some(now - chrono::TimeDelta::seconds(30));
        data.store_playlist_detail(detail, now);
        assert_eq!(data.playlist_freshness(&"p".into(), now), Freshness::Fresh);

        let mut summary = playlist("p", &[]);
        summary.updated_at = Some(now);
        data.feed.begin_next();
        data.append_feed(Page::new(vec![summary], 1, false));
        assert_eq!(data.playlist_freshness(&"p".into(), now), Freshness::Stale);
    }

    #[test]
    fn removing_playlist_clears_every_collection() {
        let mut data = AppData::default();
        data.set_mine(vec![playlist("p", &[])]);
        data.feed.begin_next();
        data.append_feed(Page::new(vec![playlist("p", &[])], 1, true));
        data.remove_playlist(&"p".into());

        assert!(data.mine.is_empty());
        assert!(data.feed.is_empty());
        assert!(data.playlist(&"p".into()).is_none());
    }

    #[test]
    fn marking_read_decrements_unread_once() {
        let mut data = AppData::default();
        data.unread_count = 1;
        data.notifications.begin_next();
        data.notifications.append(Page::new(
            vec![Notification {
                id: "n1".into(),
                kind: NotificationKind::Like,
                actor: None,
                playlist_id: None,
                message: None,
                is_read: false,
                created_at: None,
            }],
            1,
            false,
        ));

        assert!(data.mark_notification_read(&"n1".into()));
        assert!(!data.mark_notification_read(&"n1".into()));
        assert_eq!(data.unread_count, 0);
    }

    #[test]
    fn rejected_reads_are_restored() {
        let unread = |id: &str| Notification {
            id: id.into(),
            kind: NotificationKind::Like,
            actor: None,
            playlist_id: None,
            message: None,
            is_read: false,
            created_at: None,
        };
        let mut data = AppData::default();
        data.unread_count = 2;
        data.notifications.begin_next();
        data.notifications
            .append(Page::new(vec![unread("n1"), unread("n2")], 1, false));

        assert!(data.mark_notification_read(&"n1".into()));
        assert!(data.mark_notification_unread(&"n1".into()));
        assert!(!data.mark_notification_unread(&"n1".into()));
        assert_eq!(data.unread_count, 2);

        let receipt = data.mark_all_notifications_read();
        assert_eq!(receipt.ids.len(), 2);
        assert_eq!(data.unread_count, 0);
        data.restore_read_receipt(receipt);
        assert_eq!(data.unread_count, 2);
        assert!(data.notifications.items.iter().all(|n| !n.is_read));
    }

    #[test]
    fn toasts_are_capped_and_expire() {
        let mut ui = UiState::default();
        for i in 0..5 {
            ui.info(format!("t{i}"));
        }
        assert_eq!(ui.toasts.len(), MAX_TOASTS);
        assert_eq!(ui.toasts.front().unwrap().message, "t2");

        assert!(!ui.expire_toasts(Instant::now()));
        assert!(ui.expire_toasts(Instant::now() + TOAST_LIFETIME));
        assert!(ui.toasts.is_empty());
    }

    #[test]
    fn sign_out_forgets_account_data() {
        let mut data = AppData::default();
        data.set_mine(vec![playlist("p", &[])]);
        data.unread_count = 3;
        data.sign_out();
        assert!(data.mine.is_empty());
        assert!(data.playlists.is_empty());
        assert_eq!(data.unread_count, 0);
        assert_eq!(data.auth.status, AuthStatus::SignedOut);
    }
}
