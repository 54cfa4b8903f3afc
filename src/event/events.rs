use crate::{
    model::{
        Notification, NotificationId, Page, Playlist, PlaylistDraft, PlaylistId, SearchResults,
        Song, SongDraft, User, UserId,
    },
    store::{Confirmation, Mutation, Pending, ReadReceipt},
};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    // Session
    SessionRestored(User),
    SessionInvalid(String),
    SignedIn(User),
    AuthFailed(String),
    SignedOut,
    SessionExpired,
    WelcomeDone,

    // Data
    FeedLoaded(Page<Playlist>),
    FeedFailed(u32, String),
    DiscoverLoaded(Page<Playlist>),
    DiscoverFailed(u32, String),
    LibraryLoaded {
        mine: Vec<Playlist>,
        saved: Vec<Playlist>,
    },
    PlaylistFetched(Playlist),
    PlaylistFetchFailed(PlaylistId, String),
    PlaylistCreated(Playlist),
    PlaylistUpdated(Playlist),
    PlaylistDeleted(PlaylistId),
    SongAdded(PlaylistId, Song),
    SearchResults(String, SearchResults),
    UserFetched(User, Vec<Playlist>),
    NotificationsLoaded(Page<Notification>),
    NotificationsFailed(u32, String),
    UnreadCount(u32),
    MarkReadFailed(NotificationId, String),
    MarkAllReadFailed(ReadReceipt, String),
    ShareLink(PlaylistId, String),
    MutationSettled(Pending, Result<Confirmation, String>),
    FetchError(String),

    // Playback
    TrackStarted(Song),
    TrackEnded,
    QueueEnded,
    ExternalPlayback(Song),
    PlaybackFailed(Song, String),

    // Commands
    Login {
        email: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
    },
    Logout,
    RefreshFeed,
    LoadMoreFeed,
    RefreshDiscover,
    LoadMoreDiscover,
    RefreshLibrary,
    RefreshNotifications,
    LoadMoreNotifications,
    MarkRead(NotificationId),
    MarkAllRead,
    OpenPlaylist(PlaylistId),
    FetchPlaylist(PlaylistId),
    OpenUser(UserId),
    FetchUser(UserId),
    Search(String),
    Mutate(Mutation),
    SharePlaylist(PlaylistId),
    CreatePlaylist(PlaylistDraft),
    UpdatePlaylist(PlaylistId, PlaylistDraft),
    DeletePlaylist(PlaylistId),
    AddSong(PlaylistId, SongDraft),
    PlayPlaylist(PlaylistId, usize),
    PlaySong(Song),
    QueueSong(Song),
    PlayQueueIndex(usize),
    RemoveFromQueue(usize),
    OpenExternal(String),
}
