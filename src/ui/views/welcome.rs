use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tracing::warn;

use crate::{
    event::events::Event,
    services::welcome::{PAGES, WelcomeState},
    store::AppState,
    ui::{
        context::AppContext,
        traits::{Action, View},
    },
    util::colors,
};

pub struct Welcome {
    state: WelcomeState,
}

impl Welcome {
    pub fn new(state: WelcomeState) -> Self {
        Self { state }
    }

    fn finish(&mut self, ctx: &AppContext) {
        if let Err(e) = self.state.mark_seen() {
            warn!(error = %e, "welcome_not_persisted");
        }
        ctx.send(Event::WelcomeDone);
    }
}

#[async_trait]
impl View for Welcome {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let [column] = Layout::horizontal([Constraint::Length(60)])
            .flex(Flex::Center)
            .areas(area);
        let [body] = Layout::vertical([Constraint::Length(9)])
            .flex(Flex::Center)
            .areas(column);

        let (title, text) = self.state.current();
        let dots: Vec<Span> = (0..PAGES.len())
            .map(|i| {
                if i == self.state.page() {
                    Span::styled("● ", Style::default().fg(colors::PRIMARY))
                } else {
                    Span::styled("○ ", Style::default().fg(colors::NEUTRAL))
                }
            })
            .collect();

        let hint = if self.state.is_last() {
            "Enter: get started"
        } else {
            "→ / Enter: next · ←: back · Esc: skip"
        };

        let lines = vec![
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(text),
            Line::default(),
            Line::from(dots),
            Line::default(),
            Line::from(Span::styled(hint, Style::default().fg(colors::MUTED))),
        ];

        f.render_widget(
            Paragraph::new(lines).centered().wrap(Wrap { trim: true }),
            body,
        );
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match key.code {
            KeyCode::Right | KeyCode::Enter | KeyCode::Char('l') | KeyCode::Char(' ') => {
                if !self.state.advance() {
                    self.finish(ctx);
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.state.back(),
            KeyCode::Esc => self.finish(ctx),
            _ => {}
        }
        Some(Action::None)
    }

    fn is_fullscreen(&self) -> bool {
        true
    }
}
