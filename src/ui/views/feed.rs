use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{ListItem, ListState, Paragraph},
};

use crate::{
    event::events::Event,
    model::PlaylistId,
    store::{AppState, Mutation, Pager},
    ui::{
        context::AppContext,
        traits::{Action, View},
        util::{near_end, step_selection},
        views::common::{playlist_item, render_empty, render_list, render_loading, title_line},
    },
    util::colors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Playlists from people the user follows.
    Following,
    Discover,
}

impl FeedSource {
    fn pager(self, state: &AppState) -> &Pager<PlaylistId> {
        match self {
            FeedSource::Following => &state.data.feed,
            FeedSource::Discover => &state.data.discover,
        }
    }

    fn refresh(self) -> Event {
        match self {
            FeedSource::Following => Event::RefreshFeed,
            FeedSource::Discover => Event::RefreshDiscover,
        }
    }

    fn load_more(self) -> Event {
        match self {
            FeedSource::Following => Event::LoadMoreFeed,
            FeedSource::Discover => Event::LoadMoreDiscover,
        }
    }
}

pub struct Feed {
    source: FeedSource,
    list_state: ListState,
}

impl Feed {
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            list_state: ListState::default(),
        }
    }

    fn selected_id<'a>(&self, state: &'a AppState) -> Option<&'a PlaylistId> {
        let pager = self.source.pager(state);
        self.list_state.selected().and_then(|i| pager.items.get(i))
    }

    fn maybe_load_more(&self, state: &AppState, ctx: &AppContext) {
        let pager = self.source.pager(state);
        if pager.has_more() && !pager.is_loading() && near_end(&self.list_state, pager.len()) {
            ctx.send(self.source.load_more());
        }
    }
}

#[async_trait]
impl View for Feed {
    async fn on_mount(&mut self, state: &AppState, ctx: &AppContext) {
        if self.source.pager(state).is_pristine() {
            ctx.send(self.source.refresh());
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, _ctx: &AppContext) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        let title = match self.source {
            FeedSource::Following => "Feed",
            FeedSource::Discover => "Discover",
        };
        f.render_widget(
            Paragraph::new(title_line(
                title,
                "Enter: open · l: like · s: save · u: owner · R: refresh",
            )),
            header,
        );

        let pager = self.source.pager(state);
        if pager.is_empty() {
            if pager.is_loading() {
                render_loading(f, body, "Loading playlists...");
            } else if pager.is_pristine() {
                render_empty(f, body, "Couldn't load playlists. Press R to retry.");
            } else if self.source == FeedSource::Following {
                render_empty(f, body, "Nothing here yet. Follow people from Discover.");
            } else {
                render_empty(f, body, "No public playlists yet.");
            }
            return;
        }

        let items: Vec<ListItem> = state
            .data
            .resolve(pager.items.iter())
            .into_iter()
            .map(|p| playlist_item(p, body.width))
            .collect();
        render_list(f, body, items, &mut self.list_state);

        let status = if pager.is_loading() {
            "Loading more…"
        } else if !pager.has_more() {
            "You're all caught up"
        } else {
            ""
        };
        f.render_widget(
            Paragraph::new(Line::from(status)).style(Style::default().fg(colors::MUTED)),
            footer,
        );
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        let len = self.source.pager(state).len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step_selection(&mut self.list_state, len, 1);
                self.maybe_load_more(state, ctx);
            }
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Char('g') => step_selection(&mut self.list_state, len, -(len as isize)),
            KeyCode::Char('G') => {
                step_selection(&mut self.list_state, len, len as isize);
                self.maybe_load_more(state, ctx);
            }
            KeyCode::Char('R') => {
                self.list_state.select(None);
                ctx.send(self.source.refresh());
            }
            KeyCode::Enter => {
                let id = self.selected_id(state)?;
                ctx.send(Event::OpenPlaylist(id.clone()));
            }
            KeyCode::Char('l') => {
                let playlist = state.data.playlist(self.selected_id(state)?)?;
                ctx.send(Event::Mutate(Mutation::toggle_like(playlist)));
            }
            KeyCode::Char('s') => {
                let playlist = state.data.playlist(self.selected_id(state)?)?;
                ctx.send(Event::Mutate(Mutation::toggle_save(playlist)));
            }
            KeyCode::Char('u') => {
                let playlist = state.data.playlist(self.selected_id(state)?)?;
                ctx.send(Event::OpenUser(playlist.owner.id.clone()));
            }
            _ => return None,
        }
        Some(Action::None)
    }
}
