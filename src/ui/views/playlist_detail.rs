use async_trait::async_trait;
use chrono::Utc;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, ListState, Padding, Paragraph},
};
use tracing::debug;

use crate::{
    event::events::Event,
    model::{Playlist, PlaylistId, SongId},
    services::social,
    store::{AppState, Freshness, Mutation},
    ui::{
        context::AppContext,
        message::ViewRoute,
        traits::{Action, View},
        util::{get_active_track_icon, step_selection},
        views::common::{render_empty, render_list, render_loading},
    },
    util::{
        colors,
        text::{format_duration, plural},
    },
};

pub struct PlaylistDetail {
    id: PlaylistId,
    list_state: ListState,
    loading: bool,
    failed: bool,
    confirm_delete: bool,
}

impl PlaylistDetail {
    pub fn new(id: PlaylistId) -> Self {
        Self {
            id,
            list_state: ListState::default(),
            loading: false,
            failed: false,
            confirm_delete: false,
        }
    }

    fn header(&self, playlist: &Playlist, owned: bool) -> Paragraph<'static> {
        let gradient = playlist.gradient();
        let from = colors::parse_hex(&gradient.from).unwrap_or(colors::PRIMARY);
        let to = colors::parse_hex(&gradient.to).unwrap_or(colors::SECONDARY);

        let mut flags = Vec::new();
        if playlist.is_liked {
            flags.push(Span::styled(" ♥ liked", Style::default().fg(colors::ACCENT)));
        }
        if playlist.is_saved {
            flags.push(Span::styled(" ★ saved", Style::default().fg(colors::ACCENT)));
        }
        if !playlist.is_public {
            flags.push(Span::styled(" private", Style::default().fg(colors::MUTED)));
        }

        let mut title = vec![
            Span::styled("██", Style::default().fg(from)),
            Span::styled("██ ", Style::default().fg(to)),
            Span::styled(
                playlist.title.clone(),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        title.extend(flags);

        let hint = if self.confirm_delete {
            Span::styled(
                "Delete this playlist? y: yes · any other key: cancel",
                Style::default().fg(colors::ERROR),
            )
        } else if owned {
            Span::styled(
                "Enter: play · l/s/S: like/save/share · a: add · d: remove · J/K: move · e: edit · D: delete",
                Style::default().fg(colors::MUTED),
            )
        } else {
            Span::styled(
                "Enter: play · q: queue · l: like · s: save · S: share · u: owner · O: open link",
                Style::default().fg(colors::MUTED),
            )
        };

        Paragraph::new(vec![
            Line::from(title),
            Line::from(format!("By {}", playlist.owner.username)),
            Line::from(format!(
                "{} · {} · {}",
                plural(playlist.song_count(), "song", "songs"),
                plural(playlist.likes_count, "like", "likes"),
                plural(playlist.saves_count, "save", "saves"),
            )),
            Line::from(Span::styled(
                playlist.description.clone().unwrap_or_default(),
                Style::default().fg(colors::MUTED),
            )),
            Line::from(hint),
        ])
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .padding(Padding::new(1, 1, 0, 0)),
        )
    }

    /// Moves the selected song by one row and submits the new order.
    fn move_selected(
        &mut self,
        playlist: &Playlist,
        down: bool,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<()> {
        let from = self.list_state.selected()?;
        let to = if down { from + 1 } else { from.checked_sub(1)? };

        let mut order: Vec<SongId> = playlist.songs.iter().map(|s| s.id.clone()).collect();
        if !social::reorder(&mut order, from, to) {
            return None;
        }

        let mutation = Mutation::Reorder {
            playlist: self.id.clone(),
            order,
        };
        if state.data.has_pending(&mutation) {
            return None;
        }
        ctx.send(Event::Mutate(mutation));
        self.list_state.select(Some(to));
        Some(())
    }
}

#[async_trait]
impl View for PlaylistDetail {
    async fn on_mount(&mut self, state: &AppState, ctx: &AppContext) {
        match state.data.playlist_freshness(&self.id, Utc::now()) {
            Freshness::Fresh => debug!(playlist_id = %self.id, "playlist_cache_hit"),
            freshness => {
                debug!(playlist_id = %self.id, ?freshness, "playlist_fetch");
                self.loading = true;
                ctx.send(Event::FetchPlaylist(self.id.clone()));
            }
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        let Some(playlist) = state.data.playlist(&self.id) else {
            if self.failed {
                render_empty(f, area, "This playlist couldn't be loaded.");
            } else {
                render_loading(f, area, "Loading...");
            }
            return;
        };

        let owned = playlist.is_owned_by(state.data.current_user_id());
        let [header_area, songs_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);
        f.render_widget(self.header(playlist, owned), header_area);

        if playlist.songs.is_empty() {
            if self.loading {
                render_loading(f, songs_area, "Loading songs...");
            } else if owned {
                render_empty(f, songs_area, "No songs yet. Press a to add a link.");
            } else {
                render_empty(f, songs_area, "No songs yet.");
            }
            return;
        }

        let current = ctx.audio_system.current_track().map(|s| s.id);
        let is_playing = ctx.audio_system.is_playing();

        let items: Vec<ListItem> = playlist
            .songs
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let is_current = current.as_ref() == Some(&song.id);
                let prefix = if is_current {
                    format!("{} ", get_active_track_icon(is_playing))
                } else {
                    format!("{:>2} ", i + 1)
                };
                let duration = song.duration_secs.map(format_duration).unwrap_or_default();

                let item = ListItem::new(Line::from(vec![
                    Span::raw(prefix),
                    Span::raw(song.title.clone()),
                    Span::styled(
                        format!(" · {}", song.artist()),
                        Style::default().fg(colors::MUTED),
                    ),
                    Span::styled(
                        format!("  [{}] {duration}", song.platform().label()),
                        Style::default().fg(colors::NEUTRAL),
                    ),
                ]));

                if is_current {
                    item.style(
                        Style::default()
                            .fg(colors::SECONDARY)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    item
                }
            })
            .collect();

        render_list(f, songs_area, items, &mut self.list_state);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.confirm_delete {
            self.confirm_delete = false;
            if key.code == KeyCode::Char('y') {
                ctx.send(Event::DeletePlaylist(self.id.clone()));
            }
            return Some(Action::None);
        }

        let playlist = state.data.playlist(&self.id)?;
        let owned = playlist.is_owned_by(state.data.current_user_id());
        let len = playlist.songs.len();
        let selected = self
            .list_state
            .selected()
            .and_then(|i| playlist.songs.get(i));

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => step_selection(&mut self.list_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Char('g') => step_selection(&mut self.list_state, len, -(len as isize)),
            KeyCode::Char('G') => step_selection(&mut self.list_state, len, len as isize),
            KeyCode::Enter => {
                let index = self.list_state.selected().unwrap_or(0);
                ctx.send(Event::PlayPlaylist(self.id.clone(), index));
            }
            KeyCode::Char('q') => ctx.send(Event::QueueSong(selected?.clone())),
            KeyCode::Char('O') => ctx.send(Event::OpenExternal(selected?.url.clone())),
            KeyCode::Char('l') => ctx.send(Event::Mutate(Mutation::toggle_like(playlist))),
            KeyCode::Char('s') => ctx.send(Event::Mutate(Mutation::toggle_save(playlist))),
            KeyCode::Char('S') => ctx.send(Event::SharePlaylist(self.id.clone())),
            KeyCode::Char('u') => ctx.send(Event::OpenUser(playlist.owner.id.clone())),
            KeyCode::Char('R') => {
                self.loading = true;
                ctx.send(Event::FetchPlaylist(self.id.clone()));
            }
            KeyCode::Char('a') if owned => {
                return Some(Action::Overlay(ViewRoute::AddSong(self.id.clone())));
            }
            KeyCode::Char('e') if owned => {
                return Some(Action::Overlay(ViewRoute::PlaylistEditor(Some(
                    self.id.clone(),
                ))));
            }
            KeyCode::Char('d') if owned => {
                let song = selected?.id.clone();
                ctx.send(Event::Mutate(Mutation::RemoveSong {
                    playlist: self.id.clone(),
                    song,
                }));
                if len > 1 && self.list_state.selected() == Some(len - 1) {
                    self.list_state.select(Some(len - 2));
                }
            }
            KeyCode::Char('J') if owned => {
                self.move_selected(playlist, true, state, ctx);
            }
            KeyCode::Char('K') if owned => {
                self.move_selected(playlist, false, state, ctx);
            }
            KeyCode::Char('D') if owned => self.confirm_delete = true,
            _ => return None,
        }
        Some(Action::None)
    }

    async fn on_event(&mut self, event: &Event, _state: &AppState, _ctx: &AppContext) {
        match event {
            Event::PlaylistFetched(p) if p.id == self.id => {
                self.loading = false;
                self.failed = false;
            }
            Event::PlaylistFetchFailed(id, _) if *id == self.id => {
                self.loading = false;
                self.failed = true;
            }
            _ => {}
        }
    }

    fn shows_playlist(&self, id: &PlaylistId) -> bool {
        self.id == *id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeDelta;

    use super::*;
    use crate::store::{AppData, fixtures::playlist};

    fn state_with_detail(fetched_ago: TimeDelta) -> AppState {
        let mut data = AppData::with_cache_ttl(Duration::from_secs(60));
        data.store_playlist_detail(playlist("p", &["a", "b"]), Utc::now() - fetched_ago);
        AppState {
            data,
            ..AppState::default()
        }
    }

    fn fetches(rx: &flume::Receiver<Event>) -> usize {
        rx.try_iter()
            .filter(|e| matches!(e, Event::FetchPlaylist(id) if id.as_str() == "p"))
            .count()
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_fetch() {
        let (ctx, rx) = AppContext::for_tests();
        let state = state_with_detail(TimeDelta::zero());
        let mut view = PlaylistDetail::new("p".into());

        view.on_mount(&state, &ctx).await;
        assert_eq!(fetches(&rx), 0);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn stale_cache_refetches() {
        let (ctx, rx) = AppContext::for_tests();
        let state = state_with_detail(TimeDelta::minutes(5));
        let mut view = PlaylistDetail::new("p".into());

        view.on_mount(&state, &ctx).await;
        assert_eq!(fetches(&rx), 1);
        assert!(view.loading);
    }

    #[tokio::test]
    async fn missing_playlist_is_fetched() {
        let (ctx, rx) = AppContext::for_tests();
        let state = AppState::default();
        let mut view = PlaylistDetail::new("p".into());

        view.on_mount(&state, &ctx).await;
        assert_eq!(fetches(&rx), 1);
    }
}
