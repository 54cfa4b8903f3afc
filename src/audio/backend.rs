use std::time::Duration;

use super::error::AudioError;

/// Output side of the player: something that can render decoded audio.
pub trait MediaBackend: Send + Sync {
    /// Starts playing an encoded audio file. Returns its length when the
    /// container reports one.
    fn play_bytes(&self, bytes: Vec<u8>) -> Result<Option<Duration>, AudioError>;
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    fn seek(&self, position: Duration) -> Result<(), AudioError>;
    fn set_volume(&self, volume: f32);
    fn position(&self) -> Duration;
    fn is_finished(&self) -> bool;
}

/// Stand-in when the machine has no audio output.
pub struct NullBackend;

impl MediaBackend for NullBackend {
    fn play_bytes(&self, _bytes: Vec<u8>) -> Result<Option<Duration>, AudioError> {
        Err(AudioError::DeviceError("no audio output available".into()))
    }

    fn pause(&self) {}

    fn resume(&self) {}

    fn stop(&self) {}

    fn seek(&self, _position: Duration) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_volume(&self, _volume: f32) {}

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn is_finished(&self) -> bool {
        true
    }
}
