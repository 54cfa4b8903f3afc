use arc_swap::ArcSwap;
use flume::Sender;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    audio::{
        backend::MediaBackend, commands::AudioCommand, error::AudioError,
        progress::TrackProgress, state::PlaybackState,
    },
    event::events::Event,
    model::Song,
};

const MONITOR_INTERVAL: Duration = Duration::from_millis(100);

pub struct AudioController {
    engine: Arc<dyn MediaBackend>,
    http: reqwest::Client,
    state: Arc<ArcSwap<PlaybackState>>,
    event_tx: Sender<Event>,
    pub track_progress: Arc<TrackProgress>,
    current_playback_task: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    volume: Arc<AtomicU8>,
    is_muted: Arc<AtomicBool>,
}

impl AudioController {
    pub fn new(engine: Arc<dyn MediaBackend>, event_tx: Sender<Event>, volume: u8) -> Self {
        let controller = Self {
            engine,
            http: reqwest::Client::new(),
            state: Arc::new(ArcSwap::from_pointee(PlaybackState::Stopped)),
            event_tx,
            track_progress: Arc::new(TrackProgress::default()),
            current_playback_task: Arc::new(Mutex::new(None)),
            volume: Arc::new(AtomicU8::new(volume.min(100))),
            is_muted: Arc::new(AtomicBool::new(false)),
        };

        controller.start_monitor();
        controller
    }

    /// Mirrors the sink into `TrackProgress` and reports the end of a song.
    fn start_monitor(&self) {
        let engine = self.engine.clone();
        let progress = self.track_progress.clone();
        let state = self.state.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(MONITOR_INTERVAL);
            loop {
                ticker.tick().await;

                if !state.load().is_playing() {
                    continue;
                }

                progress.set_current_position(engine.position());

                if engine.is_finished() {
                    state.store(Arc::new(PlaybackState::Stopped));
                    if event_tx.send(Event::TrackEnded).is_err() {
                        break;
                    }
                }
            }
        });
    }

    pub async fn handle_command(&self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::PlaySong(song) => self.play_song(song).await,
            AudioCommand::Pause => self.pause(),
            AudioCommand::Resume => self.resume(),
            AudioCommand::Stop => self.stop().await,
            AudioCommand::SetVolume(vol) => self.set_volume(vol),
            AudioCommand::Seek(pos) => self.seek(pos),
        }
    }

    async fn play_song(&self, song: Song) {
        self.stop().await;

        let platform = song.platform();
        if !platform.is_streamable() {
            info!(song = song.id.as_str(), platform = platform.label(), "playback_external");
            self.state
                .store(Arc::new(PlaybackState::External(song.clone())));
            let _ = self.event_tx.send(Event::ExternalPlayback(song));
            return;
        }

        self.state
            .store(Arc::new(PlaybackState::Buffering(song.clone())));

        let engine = self.engine.clone();
        let http = self.http.clone();
        let progress = self.track_progress.clone();
        let event_tx = self.event_tx.clone();
        let state = self.state.clone();

        self.apply_volume();

        let task = tokio::spawn(async move {
            match load_and_play(&http, engine.as_ref(), &song).await {
                Ok(total) => {
                    let total = total.or(song.duration_secs.map(Duration::from_secs));
                    if let Some(total) = total {
                        progress.set_total_duration(total);
                    }
                    state.store(Arc::new(PlaybackState::Playing(song.clone())));
                    info!(song = song.id.as_str(), "playback_started");
                    let _ = event_tx.send(Event::TrackStarted(song));
                }
                Err(e) => {
                    warn!(song = song.id.as_str(), error = %e, "playback_failed");
                    state.store(Arc::new(PlaybackState::Error(e.to_string())));
                    let _ = event_tx.send(Event::PlaybackFailed(song, e.to_string()));
                }
            }
        });

        let mut task_guard = self.current_playback_task.lock().await;
        *task_guard = Some(task);
    }

    async fn stop(&self) {
        let mut task_guard = self.current_playback_task.lock().await;
        if let Some(task) = task_guard.take() {
            task.abort();
        }
        self.engine.stop();
        self.track_progress.reset();
        self.state.store(Arc::new(PlaybackState::Stopped));
    }

    fn pause(&self) {
        let current = self.state.load_full();
        if let PlaybackState::Playing(song) = current.as_ref() {
            self.engine.pause();
            self.state
                .store(Arc::new(PlaybackState::Paused(song.clone())));
        }
    }

    fn resume(&self) {
        let current = self.state.load_full();
        if let PlaybackState::Paused(song) = current.as_ref() {
            self.engine.resume();
            self.state
                .store(Arc::new(PlaybackState::Playing(song.clone())));
        }
    }

    fn seek(&self, pos: Duration) {
        if let Err(e) = self.engine.seek(pos) {
            warn!(error = %e, "seek_failed");
            return;
        }
        self.track_progress.set_current_position(pos);
    }

    pub fn state(&self) -> Arc<PlaybackState> {
        self.state.load_full()
    }

    pub fn is_playing(&self) -> bool {
        self.state.load().is_playing()
    }

    pub fn current_song(&self) -> Option<Song> {
        self.state.load().song().cloned()
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted.load(Ordering::Relaxed)
    }

    fn set_volume(&self, volume: f32) {
        self.set_volume_u8((volume.clamp(0.0, 1.0) * 100.0) as u8);
    }

    pub fn set_volume_u8(&self, volume: u8) {
        self.volume.store(volume.min(100), Ordering::Relaxed);
        self.is_muted.store(false, Ordering::Relaxed);
        self.apply_volume();
    }

    pub fn volume_up(&self, amount: u8) {
        let current = self.volume.load(Ordering::Relaxed);
        self.set_volume_u8(current.saturating_add(amount));
    }

    pub fn volume_down(&self, amount: u8) {
        let current = self.volume.load(Ordering::Relaxed);
        self.set_volume_u8(current.saturating_sub(amount));
    }

    pub fn toggle_mute(&self) {
        let muted = self.is_muted.load(Ordering::Relaxed);
        self.is_muted.store(!muted, Ordering::Relaxed);
        self.apply_volume();
    }

    fn apply_volume(&self) {
        let muted = self.is_muted.load(Ordering::Relaxed);
        let volume = if muted {
            0.0
        } else {
            self.volume.load(Ordering::Relaxed) as f32 / 100.0
        };
        self.engine.set_volume(volume);
    }
}

async fn load_and_play(
    http: &reqwest::Client,
    engine: &dyn MediaBackend,
    song: &Song,
) -> Result<Option<Duration>, AudioError> {
    let response = http.get(&song.url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    engine.play_bytes(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{audio::backend::NullBackend, store::fixtures::song};

    #[tokio::test]
    async fn embed_only_songs_enter_external_state() {
        let (tx, rx) = flume::unbounded();
        let controller = AudioController::new(Arc::new(NullBackend), tx, 80);

        controller
            .handle_command(AudioCommand::PlaySong(song("yt")))
            .await;

        assert!(matches!(
            controller.state().as_ref(),
            PlaybackState::External(s) if s.id.as_str() == "yt"
        ));
        assert!(matches!(rx.try_recv(), Ok(Event::ExternalPlayback(_))));
        assert!(!controller.is_playing());
        assert_eq!(controller.current_song().unwrap().id.as_str(), "yt");
    }

    #[tokio::test]
    async fn pause_only_applies_while_playing() {
        let (tx, _rx) = flume::unbounded();
        let controller = AudioController::new(Arc::new(NullBackend), tx, 80);
        controller.handle_command(AudioCommand::Pause).await;
        assert_eq!(controller.state().as_ref(), &PlaybackState::Stopped);
    }

    #[tokio::test]
    async fn volume_is_clamped_and_mute_toggles() {
        let (tx, _rx) = flume::unbounded();
        let controller = AudioController::new(Arc::new(NullBackend), tx, 90);
        controller.volume_up(50);
        assert_eq!(controller.volume(), 100);
        controller.volume_down(150);
        assert_eq!(controller.volume(), 0);

        controller.toggle_mute();
        assert!(controller.is_muted());
        controller.set_volume_u8(40);
        assert!(!controller.is_muted());
    }
}
