use crate::{
    audio::{
        backend::{MediaBackend, NullBackend},
        commands::AudioCommand,
        controller::AudioController,
        enums::RepeatMode,
        playback::RodioBackend,
        progress::TrackProgress,
        queue::{PlaybackContext, QueueManager},
        state::PlaybackState,
    },
    config::AudioConfig,
    event::events::Event,
    model::{PlaylistId, Song},
};
use flume::Sender;
use std::sync::Arc;
use tracing::warn;

pub struct AudioSystem {
    controller: AudioController,
    queue: QueueManager,
    event_tx: Sender<Event>,
    config: AudioConfig,
}

impl AudioSystem {
    pub fn new(event_tx: Sender<Event>, config: AudioConfig) -> Self {
        let engine: Arc<dyn MediaBackend> = match RodioBackend::new() {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                warn!(error = %e, "audio_output_unavailable");
                Arc::new(NullBackend)
            }
        };
        Self::with_backend(engine, event_tx, config)
    }

    pub fn with_backend(
        engine: Arc<dyn MediaBackend>,
        event_tx: Sender<Event>,
        config: AudioConfig,
    ) -> Self {
        let controller = AudioController::new(engine, event_tx.clone(), config.volume);
        Self {
            controller,
            queue: QueueManager::new(),
            event_tx,
            config,
        }
    }

    pub async fn load_context(
        &mut self,
        context: PlaybackContext,
        songs: Vec<Song>,
        index: usize,
    ) -> Option<Song> {
        let song = self.queue.load(context, songs, index);
        if let Some(s) = &song {
            self.controller
                .handle_command(AudioCommand::PlaySong(s.clone()))
                .await;
        }
        song
    }

    pub async fn play_single(&mut self, song: Song) {
        self.load_context(PlaybackContext::Single, vec![song], 0)
            .await;
    }

    pub async fn play_track_at_index(&mut self, index: usize) {
        if let Some(song) = self.queue.play_track_at_index(index) {
            self.controller
                .handle_command(AudioCommand::PlaySong(song))
                .await;
        }
    }

    pub async fn on_track_ended(&mut self) {
        if let Some(next) = self.queue.get_next_track() {
            self.controller
                .handle_command(AudioCommand::PlaySong(next))
                .await;
        } else {
            let _ = self.event_tx.send(Event::QueueEnded);
        }
    }

    pub async fn play_next(&mut self) {
        if let Some(next) = self.queue.get_next_track() {
            self.controller
                .handle_command(AudioCommand::PlaySong(next))
                .await;
        }
    }

    pub async fn play_previous(&mut self) {
        if let Some(prev) = self.queue.get_previous_track() {
            self.controller
                .handle_command(AudioCommand::PlaySong(prev))
                .await;
        }
    }

    pub fn queue_track(&mut self, song: Song) {
        self.queue.queue_track(song);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Option<Song> {
        self.queue.remove_at(index)
    }

    pub fn sync_playlist(&mut self, id: &PlaylistId, songs: &[Song]) {
        self.queue.sync_playlist(id, songs);
    }

    pub async fn play_pause(&mut self) {
        match self.controller.state().as_ref() {
            PlaybackState::Playing(_) => self.controller.handle_command(AudioCommand::Pause).await,
            PlaybackState::Paused(_) => self.controller.handle_command(AudioCommand::Resume).await,
            PlaybackState::Stopped | PlaybackState::Error(_) => {
                if let Some(song) = self.queue.current().cloned() {
                    self.controller
                        .handle_command(AudioCommand::PlaySong(song))
                        .await;
                }
            }
            PlaybackState::Buffering(_) | PlaybackState::External(_) => {}
        }
    }

    pub async fn stop(&mut self) {
        self.controller.handle_command(AudioCommand::Stop).await;
    }

    pub fn volume_up(&mut self) {
        self.controller.volume_up(self.config.volume_step);
    }

    pub fn volume_down(&mut self) {
        self.controller.volume_down(self.config.volume_step);
    }

    pub async fn seek_backwards(&mut self) {
        let (current_ms, _) = self.controller.track_progress.get_progress();
        let delta_ms = self.config.seek_step_secs * 1000;
        let new_pos_ms = current_ms.saturating_sub(delta_ms);
        self.controller
            .handle_command(AudioCommand::Seek(std::time::Duration::from_millis(
                new_pos_ms,
            )))
            .await;
    }

    pub async fn seek_forwards(&mut self) {
        let (current_ms, total_ms) = self.controller.track_progress.get_progress();
        let delta_ms = self.config.seek_step_secs * 1000;
        let mut new_pos_ms = current_ms.saturating_add(delta_ms);
        if total_ms > 0 {
            new_pos_ms = new_pos_ms.min(total_ms);
        }
        self.controller
            .handle_command(AudioCommand::Seek(std::time::Duration::from_millis(
                new_pos_ms,
            )))
            .await;
    }

    pub fn toggle_mute(&mut self) {
        self.controller.toggle_mute();
    }

    pub fn toggle_repeat_mode(&mut self) {
        self.queue.toggle_repeat_mode();
    }

    pub fn toggle_shuffle(&mut self) {
        self.queue.toggle_shuffle();
    }

    pub fn state(&self) -> Arc<PlaybackState> {
        self.controller.state()
    }

    pub fn current_track(&self) -> Option<Song> {
        self.controller.current_song()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.queue.repeat_mode
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.is_shuffled
    }

    pub fn volume(&self) -> u8 {
        self.controller.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.controller.is_muted()
    }

    pub fn track_progress(&self) -> &Arc<TrackProgress> {
        &self.controller.track_progress
    }

    pub fn queue(&self) -> &[Song] {
        &self.queue.queue
    }

    pub fn current_track_index(&self) -> usize {
        self.queue.current_track_index
    }

    pub fn playback_context(&self) -> &PlaybackContext {
        &self.queue.playback_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::song;

    fn system() -> (AudioSystem, flume::Receiver<Event>) {
        let (tx, rx) = flume::unbounded();
        (
            AudioSystem::with_backend(Arc::new(NullBackend), tx, AudioConfig::default()),
            rx,
        )
    }

    #[tokio::test]
    async fn next_walks_the_queue_then_reports_end() {
        let (mut audio, rx) = system();
        audio
            .load_context(
                PlaybackContext::List,
                vec![song("a"), song("b")],
                0,
            )
            .await;
        assert_eq!(audio.current_track().unwrap().id.as_str(), "a");

        audio.on_track_ended().await;
        assert_eq!(audio.current_track().unwrap().id.as_str(), "b");

        while rx.try_recv().is_ok() {}
        audio.on_track_ended().await;
        assert!(rx.try_iter().any(|e| matches!(e, Event::QueueEnded)));
    }

    #[tokio::test]
    async fn previous_returns_to_earlier_song() {
        let (mut audio, _rx) = system();
        audio
            .load_context(
                PlaybackContext::List,
                vec![song("a"), song("b"), song("c")],
                0,
            )
            .await;
        audio.play_next().await;
        audio.play_previous().await;
        assert_eq!(audio.current_track().unwrap().id.as_str(), "a");
        assert_eq!(audio.current_track_index(), 0);
    }
}
