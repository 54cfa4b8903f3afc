use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{ListItem, ListState, Paragraph, Tabs},
};

use crate::{
    event::events::Event,
    model::SearchResults,
    store::{AppState, Mutation},
    ui::{
        components::text_input::TextInput,
        context::AppContext,
        traits::{Action, View},
        util::step_selection,
        views::common::{playlist_item, render_empty, render_list, render_loading},
    },
    util::{colors, text::format_duration},
};

const TABS: [&str; 3] = ["Playlists", "People", "Songs"];

pub struct Search {
    input: TextInput,
    editing: bool,
    tab: usize,
    list_state: ListState,
    pending_query: Option<String>,
}

impl Default for Search {
    fn default() -> Self {
        let mut input = TextInput::new("Search playlists, people and songs");
        input.focused = true;
        Self {
            input,
            editing: true,
            tab: 0,
            list_state: ListState::default(),
            pending_query: None,
        }
    }
}

impl Search {
    fn tab_len(&self, results: &SearchResults) -> usize {
        match self.tab {
            0 => results.playlists.len(),
            1 => results.users.len(),
            _ => results.songs.len(),
        }
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
        self.input.focused = editing;
    }

    fn switch_tab(&mut self, delta: isize) {
        self.tab = (self.tab as isize + delta).rem_euclid(TABS.len() as isize) as usize;
        self.list_state.select(None);
    }

    fn items(&self, state: &AppState, results: &SearchResults, width: u16) -> Vec<ListItem<'static>> {
        match self.tab {
            0 => results
                .playlists
                .iter()
                .map(|p| playlist_item(state.data.playlist(&p.id).unwrap_or(p), width))
                .collect(),
            1 => results
                .users
                .iter()
                .map(|u| {
                    let user = state.data.users.get(&u.id).unwrap_or(u);
                    let following = if user.is_following { "  following" } else { "" };
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            user.name().to_string(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  @{} · {} followers", user.username, user.followers_count),
                            Style::default().fg(colors::MUTED),
                        ),
                        Span::styled(following, Style::default().fg(colors::ACCENT)),
                    ]))
                })
                .collect(),
            _ => results
                .songs
                .iter()
                .map(|s| {
                    let duration = s.duration_secs.map(format_duration).unwrap_or_default();
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            s.title.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {} · {} {duration}", s.artist(), s.platform().label()),
                            Style::default().fg(colors::MUTED),
                        ),
                    ]))
                })
                .collect(),
        }
    }
}

#[async_trait]
impl View for Search {
    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, _ctx: &AppContext) {
        let [input_area, tabs_area, body] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .areas(area);

        f.render_widget(&self.input, input_area);

        let tabs = Tabs::new(TABS)
            .select(self.tab)
            .style(Style::default().fg(colors::MUTED))
            .highlight_style(
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, tabs_area);

        if self.pending_query.is_some() {
            render_loading(f, body, "Searching...");
            return;
        }

        let Some(results) = &state.data.search else {
            render_empty(f, body, "Type a query and press Enter. / to edit, ←/→ to switch tabs.");
            return;
        };

        if self.tab_len(results) == 0 {
            render_empty(f, body, "No matches.");
            return;
        }

        let items = self.items(state, results, body.width);
        render_list(f, body, items, &mut self.list_state);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.editing {
            match key.code {
                KeyCode::Enter => {
                    let query = self.input.value().trim().to_string();
                    if !query.is_empty() {
                        self.pending_query = Some(query.clone());
                        self.list_state.select(None);
                        ctx.send(Event::Search(query));
                    }
                    self.set_editing(false);
                }
                KeyCode::Esc | KeyCode::Down => self.set_editing(false),
                _ => {
                    self.input.handle_key(key);
                }
            }
            return Some(Action::None);
        }

        let results = state.data.search.as_ref();
        let len = results.map_or(0, |r| self.tab_len(r));

        match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') => self.set_editing(true),
            KeyCode::Left | KeyCode::Char('[') => self.switch_tab(-1),
            KeyCode::Right | KeyCode::Char(']') => self.switch_tab(1),
            KeyCode::Down | KeyCode::Char('j') => step_selection(&mut self.list_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.list_state.selected().unwrap_or(0) == 0 {
                    self.set_editing(true);
                } else {
                    step_selection(&mut self.list_state, len, -1);
                }
            }
            KeyCode::Enter => {
                let results = results?;
                let index = self.list_state.selected()?;
                match self.tab {
                    0 => ctx.send(Event::OpenPlaylist(results.playlists.get(index)?.id.clone())),
                    1 => ctx.send(Event::OpenUser(results.users.get(index)?.id.clone())),
                    _ => ctx.send(Event::PlaySong(results.songs.get(index)?.clone())),
                }
            }
            KeyCode::Char('l') if self.tab == 0 => {
                let id = &results?.playlists.get(self.list_state.selected()?)?.id;
                ctx.send(Event::Mutate(Mutation::toggle_like(state.data.playlist(id)?)));
            }
            KeyCode::Char('s') if self.tab == 0 => {
                let id = &results?.playlists.get(self.list_state.selected()?)?.id;
                ctx.send(Event::Mutate(Mutation::toggle_save(state.data.playlist(id)?)));
            }
            KeyCode::Char('f') if self.tab == 1 => {
                let id = &results?.users.get(self.list_state.selected()?)?.id;
                ctx.send(Event::Mutate(Mutation::toggle_follow(state.data.users.get(id)?)));
            }
            KeyCode::Char('q') if self.tab == 2 => {
                let song = results?.songs.get(self.list_state.selected()?)?;
                ctx.send(Event::QueueSong(song.clone()));
            }
            _ => return None,
        }
        Some(Action::None)
    }

    fn handle_paste(&mut self, text: &str) {
        if self.editing {
            self.input.paste(text);
        }
    }

    async fn on_event(&mut self, event: &Event, _state: &AppState, _ctx: &AppContext) {
        match event {
            Event::SearchResults(query, _) if self.pending_query.as_ref() == Some(query) => {
                self.pending_query = None;
            }
            Event::FetchError(_) => self.pending_query = None,
            _ => {}
        }
    }

    fn captures_text(&self) -> bool {
        self.editing
    }
}
