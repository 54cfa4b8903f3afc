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
    model::{Platform, PlaylistId, SongDraft},
    store::AppState,
    ui::{
        components::text_input::TextInput,
        context::AppContext,
        traits::{Action, View},
        views::common::popup_area,
    },
    util::colors,
};

pub struct AddSong {
    playlist: PlaylistId,
    fields: [TextInput; 3],
    focus: usize,
    error: Option<String>,
}

impl AddSong {
    pub fn new(playlist: PlaylistId) -> Self {
        let mut add = Self {
            playlist,
            fields: [
                TextInput::new("Link (YouTube, Spotify, SoundCloud, audio file…)"),
                TextInput::new("Title (optional)"),
                TextInput::new("Artist (optional)"),
            ],
            focus: 0,
            error: None,
        };
        add.sync_focus();
        add
    }

    fn sync_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.focused = i == self.focus;
        }
    }

    fn draft(&self) -> SongDraft {
        let optional = |input: &TextInput| {
            let value = input.value().trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        SongDraft {
            title: optional(&self.fields[1]),
            artist: optional(&self.fields[2]),
            ..SongDraft::new(self.fields[0].value())
        }
    }

    fn submit(&mut self) -> Option<Event> {
        let draft = self.draft();
        if !draft.is_valid() {
            self.error = Some("Paste an http(s) link to the song".into());
            return None;
        }
        Some(Event::AddSong(self.playlist.clone(), draft))
    }
}

#[async_trait]
impl View for AddSong {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let popup = popup_area(area, 70, 15);
        f.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(colors::PRIMARY))
            .title("Add a song");
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

        for (i, field) in self.fields.iter().enumerate() {
            f.render_widget(field, rows[i]);
        }

        let url = self.fields[0].value().trim();
        let status = if let Some(error) = &self.error {
            Span::styled(error.clone(), Style::default().fg(colors::ERROR))
        } else if url.is_empty() {
            Span::styled(
                "Tab: next · Enter: add · Esc: cancel",
                Style::default().fg(colors::MUTED),
            )
        } else {
            let platform = Platform::detect(url);
            let how = if platform.is_streamable() {
                "plays here"
            } else {
                "opens in browser"
            };
            Span::styled(
                format!("Detected: {} ({how})", platform.label()),
                Style::default().fg(colors::MUTED),
            )
        };
        f.render_widget(Paragraph::new(Line::from(status)), rows[3]);
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
                self.focus = (self.focus + 1) % self.fields.len();
                self.sync_focus();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                self.sync_focus();
            }
            KeyCode::Enter => {
                if let Some(event) = self.submit() {
                    ctx.send(event);
                    return Some(Action::CloseOverlay);
                }
            }
            _ => {
                self.error = None;
                self.fields[self.focus].handle_key(key);
            }
        }
        Some(Action::None)
    }

    fn handle_paste(&mut self, text: &str) {
        self.fields[self.focus].paste(text);
    }

    fn captures_text(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_links() {
        let mut add = AddSong::new(PlaylistId::from("p1"));
        add.fields[0].paste("spotify:track:123");
        assert!(add.submit().is_none());
        assert!(add.error.is_some());
    }

    #[test]
    fn optional_fields_are_dropped_when_blank() {
        let mut add = AddSong::new(PlaylistId::from("p1"));
        add.fields[0].paste(" https://soundcloud.com/artist/track ");
        add.fields[2].paste("Artist");
        match add.submit() {
            Some(Event::AddSong(id, draft)) => {
                assert_eq!(id.as_str(), "p1");
                assert_eq!(draft.url, "https://soundcloud.com/artist/track");
                assert_eq!(draft.title, None);
                assert_eq!(draft.artist.as_deref(), Some("Artist"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
