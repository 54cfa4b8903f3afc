use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, ListState, Paragraph},
};

use crate::{
    event::events::Event,
    model::{PlaylistId, UserId},
    store::{AppState, Mutation},
    ui::{
        context::AppContext,
        traits::{Action, View},
        util::step_selection,
        views::common::{playlist_item, render_empty, render_list, render_loading},
    },
    util::colors,
};

/// A user's page. `None` means the signed-in user.
pub struct Profile {
    user: Option<UserId>,
    playlists: Vec<PlaylistId>,
    loading: bool,
    list_state: ListState,
}

impl Profile {
    pub fn new(user: Option<UserId>) -> Self {
        Self {
            user,
            playlists: Vec::new(),
            loading: false,
            list_state: ListState::default(),
        }
    }

    fn user_id<'a>(&'a self, state: &'a AppState) -> Option<&'a UserId> {
        self.user.as_ref().or_else(|| state.data.current_user_id())
    }

    fn is_own(&self, state: &AppState) -> bool {
        self.user_id(state).is_some() && self.user_id(state) == state.data.current_user_id()
    }
}

#[async_trait]
impl View for Profile {
    async fn on_mount(&mut self, state: &AppState, ctx: &AppContext) {
        if let Some(id) = self.user_id(state).cloned() {
            self.loading = true;
            ctx.send(Event::FetchUser(id));
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, _ctx: &AppContext) {
        let Some(user) = self.user_id(state).and_then(|id| state.data.users.get(id)) else {
            if self.loading {
                render_loading(f, area, "Loading profile...");
            } else {
                render_empty(f, area, "Profile unavailable.");
            }
            return;
        };

        let own = self.is_own(state);
        let [header, body] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);

        let follow = if own {
            Span::styled("X: sign out", Style::default().fg(colors::MUTED))
        } else if user.is_following {
            Span::styled("Following · f: unfollow", Style::default().fg(colors::ACCENT))
        } else {
            Span::styled("f: follow", Style::default().fg(colors::MUTED))
        };

        f.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    Span::styled(
                        user.name().to_string(),
                        Style::default()
                            .fg(colors::PRIMARY)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  @{}", user.username),
                        Style::default().fg(colors::MUTED),
                    ),
                ]),
                Line::from(user.bio.clone().unwrap_or_default()),
                Line::from(format!(
                    "{} followers · {} following",
                    user.followers_count, user.following_count
                )),
                Line::from(follow),
            ])
            .block(Block::default().borders(Borders::BOTTOM)),
            header,
        );

        let playlists = state.data.resolve(self.playlists.iter());
        if playlists.is_empty() {
            if self.loading {
                render_loading(f, body, "Loading playlists...");
            } else {
                render_empty(f, body, "No public playlists.");
            }
            return;
        }

        let items: Vec<ListItem> = playlists
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
        let len = self.playlists.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step_selection(&mut self.list_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Enter => {
                let id = self.playlists.get(self.list_state.selected()?)?;
                ctx.send(Event::OpenPlaylist(id.clone()));
            }
            KeyCode::Char('f') if !self.is_own(state) => {
                let user = state.data.users.get(self.user_id(state)?)?;
                ctx.send(Event::Mutate(Mutation::toggle_follow(user)));
            }
            KeyCode::Char('X') if self.is_own(state) => ctx.send(Event::Logout),
            KeyCode::Char('R') => {
                let id = self.user_id(state)?.clone();
                self.loading = true;
                ctx.send(Event::FetchUser(id));
            }
            _ => return None,
        }
        Some(Action::None)
    }

    async fn on_event(&mut self, event: &Event, state: &AppState, _ctx: &AppContext) {
        match event {
            Event::UserFetched(user, playlists) if Some(&user.id) == self.user_id(state) => {
                self.loading = false;
                self.playlists = playlists.iter().map(|p| p.id.clone()).collect();
            }
            Event::FetchError(_) => self.loading = false,
            Event::PlaylistDeleted(id) => self.playlists.retain(|p| p != id),
            _ => {}
        }
    }
}
