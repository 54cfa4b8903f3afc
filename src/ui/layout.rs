use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::{self, border},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    ui::{
        app::App,
        components::{
            player::PlayerWidget,
            sidebar::{Sidebar, SidebarEntry},
            toast::ToastStack,
        },
        message::ViewRoute,
    },
    util::colors,
};

pub struct AppLayout<'a> {
    pub app: &'a mut App,
}

impl<'a> AppLayout<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub fn render(self, f: &mut Frame, area: Rect) {
        let buf = f.buffer_mut();
        buf.set_style(area, Style::new().bg(colors::BACKGROUND));

        let app = self.app;

        if app.router.is_fullscreen() {
            app.router.render_base(f, area, &app.state, &app.ctx);
            app.router.render_overlay(f, area, &app.state, &app.ctx);
            Self::render_toasts(app, f, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(area);

        let main_area = chunks[0];
        let player_area = chunks[1];

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(25), Constraint::Min(1)])
            .split(main_area);

        let sidebar_area = main_chunks[0];
        let content_area = main_chunks[1];
        let sidebar_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("tunelink")
            .title_alignment(Alignment::Center);

        let content_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::Set {
                ..symbols::border::ROUNDED
            });

        let sidebar_inner = sidebar_block.inner(sidebar_area);
        let content_inner = content_block.inner(content_area);

        f.render_widget(sidebar_block, sidebar_area);
        f.render_widget(content_block, content_area);

        let sidebar_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(sidebar_inner);

        let unread = app.state.data.unread_count;
        let entries = ViewRoute::SIDEBAR
            .iter()
            .map(|route| SidebarEntry {
                label: route.sidebar_label(),
                badge: (*route == ViewRoute::Notifications && unread > 0).then_some(unread),
            })
            .collect();
        f.render_widget(
            Sidebar::new(entries, app.state.ui.sidebar_index),
            sidebar_chunks[0],
        );

        let who = match &app.state.data.auth.user {
            Some(user) => format!("@{}", user.username),
            None => "not signed in".to_string(),
        };
        f.render_widget(
            Paragraph::new(Line::from(who).fg(colors::SECONDARY)).alignment(Alignment::Center),
            sidebar_chunks[1],
        );

        app.router
            .render_base(f, content_inner, &app.state, &app.ctx);
        app.router
            .render_overlay(f, content_inner, &app.state, &app.ctx);

        let audio = &app.ctx.audio_system;
        let state = audio.state();
        let player_widget = PlayerWidget::new(
            &state,
            audio.track_progress(),
            audio.repeat_mode(),
            audio.is_shuffled(),
            if audio.is_muted() { 0 } else { audio.volume() },
        );
        f.render_widget(player_widget, player_area);

        Self::render_toasts(app, f, area);
    }

    fn render_toasts(app: &App, f: &mut Frame, area: Rect) {
        let toasts: Vec<_> = app.state.ui.toasts.iter().collect();
        if !toasts.is_empty() {
            f.render_widget(ToastStack::new(&toasts), area);
        }
    }
}
