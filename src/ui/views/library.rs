use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{ListItem, ListState, Paragraph, Tabs},
};

use crate::{
    event::events::Event,
    model::{Playlist, PlaylistId},
    store::{AppState, Mutation},
    ui::{
        components::text_input::TextInput,
        context::AppContext,
        message::ViewRoute,
        traits::{Action, View},
        util::step_selection,
        views::common::{playlist_item, render_empty, render_list, title_line},
    },
    util::{colors, fuzzy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shelf {
    Mine,
    Saved,
}

pub struct Library {
    shelf: Shelf,
    filter: TextInput,
    filtering: bool,
    list_state: ListState,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            shelf: Shelf::Mine,
            filter: TextInput::new("Filter"),
            filtering: false,
            list_state: ListState::default(),
        }
    }
}

impl Library {
    fn shelf_ids<'a>(&self, state: &'a AppState) -> &'a [PlaylistId] {
        match self.shelf {
            Shelf::Mine => &state.data.mine,
            Shelf::Saved => &state.data.saved,
        }
    }

    /// Playlists on the current shelf, narrowed and ranked by the filter.
    fn visible<'a>(&self, state: &'a AppState) -> Vec<&'a Playlist> {
        let playlists = state.data.resolve(self.shelf_ids(state));
        fuzzy::rank(self.filter.value(), &playlists, |p| {
            format!("{} {}", p.title, p.owner.username)
        })
        .into_iter()
        .map(|i| playlists[i])
        .collect()
    }

    fn selected<'a>(&self, state: &'a AppState) -> Option<&'a Playlist> {
        let index = self.list_state.selected()?;
        self.visible(state).get(index).copied()
    }

    fn set_filtering(&mut self, filtering: bool) {
        self.filtering = filtering;
        self.filter.focused = filtering;
        self.list_state.select(None);
    }
}

#[async_trait]
impl View for Library {
    async fn on_mount(&mut self, _state: &AppState, ctx: &AppContext) {
        ctx.send(Event::RefreshLibrary);
    }

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, _ctx: &AppContext) {
        let filter_height = if self.filtering || !self.filter.value().is_empty() {
            3
        } else {
            0
        };
        let [header, tabs_area, filter_area, body] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(filter_height),
            Constraint::Min(0),
        ])
        .areas(area);

        f.render_widget(
            Paragraph::new(title_line(
                "Library",
                "Enter: open · n: new playlist · /: filter · ←/→: shelf",
            )),
            header,
        );

        let tabs = Tabs::new([
            format!("My playlists ({})", state.data.mine.len()),
            format!("Saved ({})", state.data.saved.len()),
        ])
        .select(match self.shelf {
            Shelf::Mine => 0,
            Shelf::Saved => 1,
        })
        .style(Style::default().fg(colors::MUTED))
        .highlight_style(
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(tabs, tabs_area);

        if filter_height > 0 {
            f.render_widget(&self.filter, filter_area);
        }

        let visible = self.visible(state);
        if visible.is_empty() {
            let text = match (self.shelf, self.filter.value().is_empty()) {
                (_, false) => "Nothing matches the filter.",
                (Shelf::Mine, true) => "No playlists yet. Press n to create one.",
                (Shelf::Saved, true) => "Save playlists from the feed with s.",
            };
            render_empty(f, body, text);
            return;
        }

        let items: Vec<ListItem> = visible
            .into_iter()
            .map(|p| playlist_item(p, body.width))
            .collect();
        render_list(f, body, items, &mut self.list_state);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.filtering {
            match key.code {
                KeyCode::Enter | KeyCode::Down => {
                    self.filtering = false;
                    self.filter.focused = false;
                }
                KeyCode::Esc => self.set_filtering(false),
                _ => {
                    self.filter.handle_key(key);
                    self.list_state.select(None);
                }
            }
            return Some(Action::None);
        }

        let len = self.visible(state).len();
        match key.code {
            KeyCode::Char('/') => self.set_filtering(true),
            KeyCode::Esc if !self.filter.value().is_empty() => {
                self.filter.clear();
                self.list_state.select(None);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('[') | KeyCode::Char(']') => {
                self.shelf = match self.shelf {
                    Shelf::Mine => Shelf::Saved,
                    Shelf::Saved => Shelf::Mine,
                };
                self.list_state.select(None);
            }
            KeyCode::Down | KeyCode::Char('j') => step_selection(&mut self.list_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Char('R') => ctx.send(Event::RefreshLibrary),
            KeyCode::Char('n') => return Some(Action::Overlay(ViewRoute::PlaylistEditor(None))),
            KeyCode::Enter => ctx.send(Event::OpenPlaylist(self.selected(state)?.id.clone())),
            KeyCode::Char('l') => {
                ctx.send(Event::Mutate(Mutation::toggle_like(self.selected(state)?)))
            }
            KeyCode::Char('s') => {
                ctx.send(Event::Mutate(Mutation::toggle_save(self.selected(state)?)))
            }
            _ => return None,
        }
        Some(Action::None)
    }

    fn handle_paste(&mut self, text: &str) {
        if self.filtering {
            self.filter.paste(text);
        }
    }

    fn captures_text(&self) -> bool {
        self.filtering
    }
}
