use crate::model::Song;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Buffering(Song),
    Playing(Song),
    Paused(Song),
    /// The song lives on a platform we can only link to.
    External(Song),
    Error(String),
}

impl PlaybackState {
    pub fn song(&self) -> Option<&Song> {
        match self {
            PlaybackState::Buffering(s)
            | PlaybackState::Playing(s)
            | PlaybackState::Paused(s)
            | PlaybackState::External(s) => Some(s),
            PlaybackState::Stopped | PlaybackState::Error(_) => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing(_))
    }
}
