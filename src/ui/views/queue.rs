use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{ListItem, ListState, Paragraph},
};

use crate::{
    audio::queue::PlaybackContext,
    event::events::Event,
    store::AppState,
    ui::{
        context::AppContext,
        traits::{Action, View},
        util::{get_active_track_icon, step_selection},
        views::common::{render_empty, render_list, title_line},
    },
    util::colors,
};

#[derive(Default)]
pub struct Queue {
    list_state: ListState,
}

#[async_trait]
impl View for Queue {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let audio = &ctx.audio_system;
        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

        let source = match audio.playback_context() {
            PlaybackContext::Playlist { title, .. } => format!("Queue · from {title}"),
            PlaybackContext::List => "Queue · from a list".to_string(),
            PlaybackContext::Single => "Queue · single song".to_string(),
            PlaybackContext::Unknown => "Queue".to_string(),
        };
        f.render_widget(
            Paragraph::new(title_line(&source, "Enter: play · d: remove")),
            header,
        );

        let songs = audio.queue();
        if songs.is_empty() {
            render_empty(f, body, "The queue is empty. Play a playlist to fill it.");
            return;
        }

        let current = audio.current_track_index();
        let is_playing = audio.is_playing();
        let items: Vec<ListItem> = songs
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let prefix = if i == current {
                    format!("{} ", get_active_track_icon(is_playing))
                } else {
                    "  ".to_string()
                };
                let style = if i == current {
                    Style::default()
                        .fg(colors::SECONDARY)
                        .add_modifier(Modifier::BOLD)
                } else if i < current {
                    Style::default().fg(colors::MUTED)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(song.title.clone(), style),
                    Span::styled(
                        format!(" · {} [{}]", song.artist(), song.platform().label()),
                        Style::default().fg(colors::MUTED),
                    ),
                ]))
            })
            .collect();

        render_list(f, body, items, &mut self.list_state);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        let len = ctx.audio_system.queue().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step_selection(&mut self.list_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Enter => ctx.send(Event::PlayQueueIndex(self.list_state.selected()?)),
            KeyCode::Char('d') => {
                let index = self.list_state.selected()?;
                ctx.send(Event::RemoveFromQueue(index));
                if index + 1 >= len && index > 0 {
                    self.list_state.select(Some(index - 1));
                }
            }
            _ => return None,
        }
        Some(Action::None)
    }
}
