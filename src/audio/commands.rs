use std::time::Duration;

use crate::model::Song;

#[derive(Debug, Clone)]
pub enum AudioCommand {
    PlaySong(Song),
    Pause,
    Resume,
    Stop,
    Seek(Duration),
    SetVolume(f32),
}
