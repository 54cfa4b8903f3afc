use async_trait::async_trait;
use ratatui::crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::{
    event::events::Event,
    model::PlaylistId,
    store::AppState,
    ui::{context::AppContext, message::ViewRoute},
};

/// What a view asks of the application after handling a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The key was consumed; nothing else happens.
    None,
    Back,
    Navigate(ViewRoute),
    Overlay(ViewRoute),
    CloseOverlay,
    Quit,
}

#[async_trait]
pub trait View: Send + Sync {
    async fn on_mount(&mut self, _state: &AppState, _ctx: &AppContext) {}

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext);

    /// `None` lets the key fall through to the global bindings.
    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action>;

    async fn on_event(&mut self, _event: &Event, _state: &AppState, _ctx: &AppContext) {}

    fn handle_paste(&mut self, _text: &str) {}

    /// Views that take the whole screen, without sidebar or player bar.
    fn is_fullscreen(&self) -> bool {
        false
    }

    /// Views holding a focused text field swallow global shortcuts.
    fn captures_text(&self) -> bool {
        false
    }

    fn shows_playlist(&self, _id: &PlaylistId) -> bool {
        false
    }
}
