use std::sync::Arc;

use flume::Receiver;
use ratatui::Frame;
use tracing::warn;

use crate::{
    audio::system::AudioSystem,
    config::Config,
    event::events::Event,
    http::{ApiService, KeyringVault, NotificationApi, SessionStore},
    services::{notifications::spawn_unread_poller, welcome::WelcomeState},
    store::{AppData, AppState, AuthStatus, UiState},
    util::{external::open_in_browser, log::get_data_dir, task::TaskManager},
};

use super::{
    context::AppContext,
    layout::AppLayout,
    message::{AppMessage, ViewRoute},
    router::Router,
    tui::{self, TerminalEvent},
    util::handler::EventHandler,
    views,
};

pub const UNREAD_POLLER: &str = "unread_poller";

pub struct App {
    pub state: AppState,
    pub ctx: AppContext,
    pub router: Router,
    pub task_manager: TaskManager,
    pub event_rx: Receiver<Event>,
    pub has_focus: bool,
    pub should_quit: bool,
}

impl App {
    pub async fn new(config: Config) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();

        let session = SessionStore::new(Box::new(KeyringVault));
        let api = Arc::new(ApiService::new(&config, session)?);
        let audio_system = AudioSystem::new(event_tx.clone(), config.audio.clone());

        let state = AppState {
            data: AppData::with_cache_ttl(config.cache_ttl()),
            ui: UiState::default(),
        };

        let initial = if WelcomeState::load(&get_data_dir()).should_show() {
            ViewRoute::Welcome
        } else if api.session.is_authenticated() {
            ViewRoute::Feed
        } else {
            ViewRoute::Login
        };

        Ok(Self {
            state,
            ctx: AppContext {
                api,
                audio_system,
                event_tx,
                config,
            },
            router: Router::new(views::build(&initial)),
            task_manager: TaskManager::new(),
            event_rx,
            has_focus: true,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = tui::Tui::new()?.paste(true);
        tui.enter()?;

        EventHandler::handle_event(self, TerminalEvent::Init, &mut tui).await?;
        while !self.should_quit {
            tui.draw(|f| {
                self.ui(f);
            })?;

            EventHandler::handle_events(self, &mut tui).await?;
        }

        self.task_manager.abort_all();
        self.ctx.audio_system.stop().await;
        tui.exit()?;
        Ok(())
    }

    fn ui(&mut self, frame: &mut Frame) {
        if self.has_focus {
            let area = frame.area();
            AppLayout::new(self).render(frame, area);
        }
    }

    /// Verifies a restored token and mounts the first view.
    pub async fn start(&mut self) {
        if self.ctx.api.session.is_authenticated() {
            self.state.data.auth.status = AuthStatus::Checking;
            let api = self.ctx.api.clone();
            EventHandler::spawn(self, "auth", async move {
                match api.current_user().await {
                    Ok(user) => Event::SessionRestored(user),
                    Err(e) if e.is_unauthorized() => Event::SessionInvalid(e.to_string()),
                    Err(e) => Event::FetchError(format!("Couldn't reach the server: {e}")),
                }
            });
        } else {
            self.state.data.auth.status = AuthStatus::SignedOut;
        }

        if let Some(view) = self.router.active_view_mut() {
            view.on_mount(&self.state, &self.ctx).await;
        }
    }

    /// Where a signed-in (or signed-out) user lands.
    pub fn home_route(&self) -> ViewRoute {
        match self.state.data.auth.status {
            AuthStatus::SignedIn | AuthStatus::Checking => ViewRoute::Feed,
            AuthStatus::Unknown | AuthStatus::SignedOut => ViewRoute::Login,
        }
    }

    pub async fn go_home(&mut self) {
        self.state.ui.sidebar_index = 0;
        let route = self.home_route();
        self.reset_to(&route).await;
    }

    pub async fn reset_to(&mut self, route: &ViewRoute) {
        let mut view = views::build(route);
        view.on_mount(&self.state, &self.ctx).await;
        self.router.reset(view);
    }

    pub fn start_poller(&mut self) {
        let api: Arc<dyn NotificationApi> = self.ctx.api.clone();
        let handle = spawn_unread_poller(
            api,
            self.ctx.config.poll_interval(),
            self.ctx.event_tx.clone(),
        );
        self.task_manager.spawn(UNREAD_POLLER, handle);
    }

    /// Forgets everything tied to the account and returns to the login form.
    pub async fn end_session(&mut self) {
        self.task_manager.abort_all();
        self.ctx.api.session.end();
        self.ctx.audio_system.stop().await;
        self.state.data.sign_out();
        self.reset_to(&ViewRoute::Login).await;
    }

    async fn select_sidebar(&mut self, index: usize) {
        let routes = ViewRoute::SIDEBAR;
        if let Some(route) = routes.get(index) {
            self.state.ui.sidebar_index = index;
            self.reset_to(route).await;
        }
    }

    pub async fn update(&mut self, msg: AppMessage) {
        let audio = &mut self.ctx.audio_system;
        match msg {
            AppMessage::Quit => self.should_quit = true,
            AppMessage::TogglePlayPause => audio.play_pause().await,
            AppMessage::NextTrack => audio.play_next().await,
            AppMessage::PreviousTrack => audio.play_previous().await,
            AppMessage::VolumeUp => audio.volume_up(),
            AppMessage::VolumeDown => audio.volume_down(),
            AppMessage::SeekForward => audio.seek_forwards().await,
            AppMessage::SeekBackward => audio.seek_backwards().await,
            AppMessage::ToggleShuffle => audio.toggle_shuffle(),
            AppMessage::ToggleRepeat => audio.toggle_repeat_mode(),
            AppMessage::ToggleMute => audio.toggle_mute(),
            AppMessage::OpenCurrentExternally => {
                if let Some(song) = audio.current_track() {
                    if let Err(e) = open_in_browser(&song.url) {
                        self.state.ui.error(format!("Couldn't open the browser: {e}"));
                    }
                }
            }

            AppMessage::NavigateTo(route) => {
                let mut view = views::build(&route);
                view.on_mount(&self.state, &self.ctx).await;
                self.router.clear_overlay();
                self.router.push(view);
            }
            AppMessage::ShowOverlay(route) => {
                let mut view = views::build(&route);
                view.on_mount(&self.state, &self.ctx).await;
                self.router.set_overlay(view);
            }
            AppMessage::CloseOverlay => self.router.clear_overlay(),
            AppMessage::GoBack => {
                if self.router.has_overlay() {
                    self.router.clear_overlay();
                } else {
                    self.router.pop();
                }
            }
            AppMessage::NextSidebarItem => {
                let next = (self.state.ui.sidebar_index + 1) % ViewRoute::SIDEBAR.len();
                self.select_sidebar(next).await;
            }
            AppMessage::PreviousSidebarItem => {
                let len = ViewRoute::SIDEBAR.len();
                let prev = (self.state.ui.sidebar_index + len - 1) % len;
                self.select_sidebar(prev).await;
            }
            AppMessage::SetSidebarIndex(index) => self.select_sidebar(index).await,
            AppMessage::DismissToasts => self.state.ui.toasts.clear(),
        }
    }
}
