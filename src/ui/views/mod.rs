pub mod add_song;
pub mod common;
pub mod feed;
pub mod library;
pub mod login;
pub mod notifications;
pub mod playlist_detail;
pub mod playlist_editor;
pub mod profile;
pub mod queue;
pub mod search;
pub mod welcome;

pub use add_song::AddSong;
pub use feed::{Feed, FeedSource};
pub use library::Library;
pub use login::Login;
pub use notifications::Notifications;
pub use playlist_detail::PlaylistDetail;
pub use playlist_editor::PlaylistEditor;
pub use profile::Profile;
pub use queue::Queue;
pub use search::Search;
pub use welcome::Welcome;

use crate::{services::welcome::WelcomeState, ui::message::ViewRoute, util::log::get_data_dir};

use super::traits::View;

pub fn build(route: &ViewRoute) -> Box<dyn View> {
    match route {
        ViewRoute::Login => Box::new(Login::default()),
        ViewRoute::Welcome => Box::new(Welcome::new(WelcomeState::load(&get_data_dir()))),
        ViewRoute::Feed => Box::new(Feed::new(FeedSource::Following)),
        ViewRoute::Discover => Box::new(Feed::new(FeedSource::Discover)),
        ViewRoute::Search => Box::new(Search::default()),
        ViewRoute::Library => Box::new(Library::default()),
        ViewRoute::Notifications => Box::new(Notifications::default()),
        ViewRoute::Queue => Box::new(Queue::default()),
        ViewRoute::Profile(user) => Box::new(Profile::new(user.clone())),
        ViewRoute::PlaylistDetail(id) => Box::new(PlaylistDetail::new(id.clone())),
        ViewRoute::PlaylistEditor(id) => Box::new(PlaylistEditor::new(id.clone())),
        ViewRoute::AddSong(id) => Box::new(AddSong::new(id.clone())),
    }
}
