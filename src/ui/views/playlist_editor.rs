use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    event::events::Event,
    model::{PlaylistDraft, PlaylistId},
    store::AppState,
    ui::{
        components::text_input::TextInput,
        context::AppContext,
        traits::{Action, View},
        views::common::popup_area,
    },
    util::colors,
};

const FIELDS: usize = 3;

/// Create form when `id` is `None`, edit form otherwise.
pub struct PlaylistEditor {
    id: Option<PlaylistId>,
    title: TextInput,
    description: TextInput,
    is_public: bool,
    focus: usize,
    error: Option<String>,
}

impl PlaylistEditor {
    pub fn new(id: Option<PlaylistId>) -> Self {
        let mut editor = Self {
            id,
            title: TextInput::new("Title"),
            description: TextInput::new("Description"),
            is_public: true,
            focus: 0,
            error: None,
        };
        editor.sync_focus();
        editor
    }

    fn sync_focus(&mut self) {
        self.title.focused = self.focus == 0;
        self.description.focused = self.focus == 1;
    }

    fn draft(&self) -> PlaylistDraft {
        let description = self.description.value().trim();
        PlaylistDraft {
            title: self.title.value().trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            is_public: self.is_public,
        }
    }

    fn submit(&mut self) -> Option<Event> {
        let draft = self.draft();
        if !draft.is_valid() {
            self.error = Some("Give the playlist a title".into());
            return None;
        }
        Some(match &self.id {
            Some(id) => Event::UpdatePlaylist(id.clone(), draft),
            None => Event::CreatePlaylist(draft),
        })
    }
}

#[async_trait]
impl View for PlaylistEditor {
    async fn on_mount(&mut self, state: &AppState, _ctx: &AppContext) {
        let Some(playlist) = self.id.as_ref().and_then(|id| state.data.playlist(id)) else {
            return;
        };
        let draft = PlaylistDraft::from_playlist(playlist);
        self.title.set_value(draft.title);
        self.description
            .set_value(draft.description.unwrap_or_default());
        self.is_public = draft.is_public;
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let popup = popup_area(area, 60, 14);
        f.render_widget(Clear, popup);

        let heading = if self.id.is_some() {
            "Edit playlist"
        } else {
            "New playlist"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(colors::PRIMARY))
            .title(heading);
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let [title_area, description_area, public_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .areas(inner);

        f.render_widget(&self.title, title_area);
        f.render_widget(&self.description, description_area);

        let checkbox = if self.is_public { "[x]" } else { "[ ]" };
        let public_style = if self.focus == 2 {
            Style::default().fg(colors::PRIMARY)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {checkbox} Public (Space to toggle)"),
                public_style,
            ))),
            public_area,
        );

        let status = match &self.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(colors::ERROR)),
            None => Span::styled(
                "Tab: next · Enter: save · Esc: cancel",
                Style::default().fg(colors::MUTED),
            ),
        };
        f.render_widget(Paragraph::new(Line::from(status)), status_area);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match key.code {
            KeyCode::Esc => return Some(Action::CloseOverlay),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FIELDS;
                self.sync_focus();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELDS - 1) % FIELDS;
                self.sync_focus();
            }
            KeyCode::Enter => {
                if let Some(event) = self.submit() {
                    ctx.send(event);
                    return Some(Action::CloseOverlay);
                }
            }
            KeyCode::Char(' ') if self.focus == 2 => self.is_public = !self.is_public,
            _ => {
                self.error = None;
                match self.focus {
                    0 => self.title.handle_key(key),
                    1 => self.description.handle_key(key),
                    _ => false,
                };
            }
        }
        Some(Action::None)
    }

    fn handle_paste(&mut self, text: &str) {
        match self.focus {
            0 => self.title.paste(text),
            1 => self.description.paste(text),
            _ => {}
        }
    }

    fn captures_text(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_and_trims_description() {
        let mut editor = PlaylistEditor::new(None);
        assert!(editor.submit().is_none());

        editor.title.paste("  Road trip ");
        editor.description.paste("   ");
        match editor.submit() {
            Some(Event::CreatePlaylist(draft)) => {
                assert_eq!(draft.title, "Road trip");
                assert_eq!(draft.description, None);
                assert!(draft.is_public);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn editing_targets_the_existing_playlist() {
        let mut editor = PlaylistEditor::new(Some(PlaylistId::from("p1")));
        editor.title.paste("Renamed");
        editor.is_public = false;
        match editor.submit() {
            Some(Event::UpdatePlaylist(id, draft)) => {
                assert_eq!(id.as_str(), "p1");
                assert!(!draft.is_public);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
