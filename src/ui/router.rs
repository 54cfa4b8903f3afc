use crate::event::events::Event;
use crate::model::PlaylistId;
use crate::store::AppState;
use crate::ui::context::AppContext;
use crate::ui::traits::{Action, View};
use crate::ui::views::{Feed, FeedSource};
use ratatui::Frame;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

pub struct Router {
    pub stack: Vec<Box<dyn View>>,
    pub overlay: Option<Box<dyn View>>,
}

impl Router {
    pub fn new(initial_view: Box<dyn View>) -> Self {
        Self {
            stack: vec![initial_view],
            overlay: None,
        }
    }

    pub fn push(&mut self, view: Box<dyn View>) {
        self.stack.push(view);
    }

    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Drops the whole history and starts over from `view`.
    pub fn reset(&mut self, view: Box<dyn View>) {
        self.stack.clear();
        self.stack.push(view);
        self.overlay = None;
    }

    /// Drops every screen showing a playlist that no longer exists.
    pub fn close_playlist(&mut self, id: &PlaylistId) {
        if self.overlay.as_ref().is_some_and(|v| v.shows_playlist(id)) {
            self.overlay = None;
        }
        self.stack.retain(|v| !v.shows_playlist(id));
        if self.stack.is_empty() {
            self.stack.push(Box::new(Feed::new(FeedSource::Following)));
        }
    }

    pub fn set_overlay(&mut self, view: Box<dyn View>) {
        self.overlay = Some(view);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn active_view(&self) -> Option<&dyn View> {
        match &self.overlay {
            Some(overlay) => Some(overlay.as_ref()),
            None => self.stack.last().map(|v| v.as_ref()),
        }
    }

    pub fn active_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
        if self.overlay.is_some() {
            self.overlay.as_mut()
        } else {
            self.stack.last_mut()
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.stack.last().is_some_and(|v| v.is_fullscreen())
    }

    pub fn captures_text(&self) -> bool {
        self.active_view().is_some_and(|v| v.captures_text())
    }

    pub fn render_base(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        if let Some(view) = self.stack.last_mut() {
            view.render(f, area, state, ctx);
        }
    }

    pub fn render_overlay(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        if let Some(overlay) = &mut self.overlay {
            overlay.render(f, area, state, ctx);
        }
    }

    pub async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match self.active_view_mut() {
            Some(view) => view.handle_input(key, state, ctx).await,
            None => None,
        }
    }

    pub async fn on_event(&mut self, event: &Event, state: &AppState, ctx: &AppContext) {
        for view in &mut self.stack {
            view.on_event(event, state, ctx).await;
        }

        if let Some(overlay) = &mut self.overlay {
            overlay.on_event(event, state, ctx).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::views::PlaylistDetail;

    #[test]
    fn closing_a_deleted_playlist_keeps_a_screen() {
        let mut router = Router::new(Box::new(PlaylistDetail::new(PlaylistId::from("p1"))));
        router.push(Box::new(PlaylistDetail::new(PlaylistId::from("p2"))));
        router.set_overlay(Box::new(PlaylistDetail::new(PlaylistId::from("p1"))));

        router.close_playlist(&PlaylistId::from("p1"));
        assert!(!router.has_overlay());
        assert_eq!(router.depth(), 1);

        router.close_playlist(&PlaylistId::from("p2"));
        assert_eq!(router.depth(), 1);
        assert!(!router.stack[0].shows_playlist(&PlaylistId::from("p2")));
    }
}
