use std::{io::Cursor, time::Duration};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::{backend::MediaBackend, error::AudioError};

pub struct RodioBackend {
    _stream: OutputStream,
    sink: Sink,
}

impl RodioBackend {
    pub fn new() -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::DeviceError(e.to_string()))?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        Ok(Self {
            _stream: stream,
            sink,
        })
    }
}

impl MediaBackend for RodioBackend {
    fn play_bytes(&self, bytes: Vec<u8>) -> Result<Option<Duration>, AudioError> {
        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::DecodingError(e.to_string()))?;
        let total = source.total_duration();
        self.sink.append(source);
        self.sink.play();
        Ok(total)
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn seek(&self, position: Duration) -> Result<(), AudioError> {
        self.sink
            .try_seek(position)
            .map_err(|e| AudioError::StreamError(e.to_string()))
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
