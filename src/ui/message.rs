use crate::model::{PlaylistId, UserId};

#[derive(Debug, Clone)]
pub enum AppMessage {
    Quit,
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBackward,
    ToggleShuffle,
    ToggleRepeat,
    ToggleMute,
    OpenCurrentExternally,

    NavigateTo(ViewRoute),
    ShowOverlay(ViewRoute),
    CloseOverlay,
    GoBack,
    NextSidebarItem,
    PreviousSidebarItem,
    SetSidebarIndex(usize),
    DismissToasts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewRoute {
    Login,
    Welcome,
    Feed,
    Discover,
    Search,
    Library,
    Notifications,
    Queue,
    Profile(Option<UserId>),
    PlaylistDetail(PlaylistId),
    PlaylistEditor(Option<PlaylistId>),
    AddSong(PlaylistId),
}

impl ViewRoute {
    pub const SIDEBAR: [ViewRoute; 7] = [
        ViewRoute::Feed,
        ViewRoute::Discover,
        ViewRoute::Search,
        ViewRoute::Library,
        ViewRoute::Notifications,
        ViewRoute::Queue,
        ViewRoute::Profile(None),
    ];

    pub fn sidebar_label(&self) -> &'static str {
        match self {
            ViewRoute::Feed => "Feed",
            ViewRoute::Discover => "Discover",
            ViewRoute::Search => "Search",
            ViewRoute::Library => "Library",
            ViewRoute::Notifications => "Notifications",
            ViewRoute::Queue => "Queue",
            ViewRoute::Profile(_) => "Profile",
            _ => "",
        }
    }
}
