use std::sync::Arc;

use flume::Sender;

use crate::{audio::system::AudioSystem, config::Config, event::events::Event, http::ApiService};

pub struct AppContext {
    pub api: Arc<ApiService>,
    pub audio_system: AudioSystem,
    pub event_tx: Sender<Event>,
    pub config: Config,
}

impl AppContext {
    /// Queues an event for the main loop. The receiver lives as long as the
    /// app, so a failed send only happens during shutdown.
    pub fn send(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
impl AppContext {
    /// A context with silent audio and an API nothing listens on.
    pub(crate) fn for_tests() -> (Self, flume::Receiver<Event>) {
        use crate::{
            audio::backend::NullBackend,
            http::{MemoryVault, SessionStore},
        };

        let (event_tx, event_rx) = flume::unbounded();
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let session = SessionStore::new(Box::new(MemoryVault::default()));
        let api = ApiService::new(&config, session).expect("client builds");
        let audio_system =
            AudioSystem::with_backend(Arc::new(NullBackend), event_tx.clone(), config.audio.clone());
        (
            Self {
                api: Arc::new(api),
                audio_system,
                event_tx,
                config,
            },
            event_rx,
        )
    }
}
