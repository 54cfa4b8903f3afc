use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    event::events::Event,
    store::AppState,
    ui::{
        components::text_input::TextInput,
        context::AppContext,
        traits::{Action, View},
    },
    util::colors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

pub struct Login {
    mode: Mode,
    username: TextInput,
    email: TextInput,
    password: TextInput,
    focus: usize,
    submitting: bool,
    error: Option<String>,
}

impl Default for Login {
    fn default() -> Self {
        let mut login = Self {
            mode: Mode::SignIn,
            username: TextInput::new("Username"),
            email: TextInput::new("Email"),
            password: TextInput::new("Password").masked(),
            focus: 0,
            submitting: false,
            error: None,
        };
        login.sync_focus();
        login
    }
}

impl Login {
    fn fields(&self) -> Vec<&TextInput> {
        match self.mode {
            Mode::SignIn => vec![&self.email, &self.password],
            Mode::Register => vec![&self.username, &self.email, &self.password],
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut TextInput {
        match (self.mode, index) {
            (Mode::Register, 0) => &mut self.username,
            (Mode::Register, 1) | (Mode::SignIn, 0) => &mut self.email,
            _ => &mut self.password,
        }
    }

    fn sync_focus(&mut self) {
        self.username.focused = false;
        self.email.focused = false;
        self.password.focused = false;
        let focus = self.focus;
        self.field_mut(focus).focused = true;
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.fields().len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
        self.sync_focus();
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::SignIn => Mode::Register,
            Mode::Register => Mode::SignIn,
        };
        self.focus = 0;
        self.error = None;
        self.sync_focus();
    }

    fn submit(&mut self) -> Option<Event> {
        let email = self.email.value().trim().to_string();
        let password = self.password.value().to_string();
        let username = self.username.value().trim().to_string();

        if email.is_empty() || password.is_empty() {
            self.error = Some("Email and password are required".into());
            return None;
        }

        let event = match self.mode {
            Mode::SignIn => Event::Login { email, password },
            Mode::Register => {
                if username.is_empty() {
                    self.error = Some("Pick a username".into());
                    return None;
                }
                Event::Register {
                    username,
                    email,
                    password,
                }
            }
        };

        self.error = None;
        self.submitting = true;
        Some(event)
    }
}

#[async_trait]
impl View for Login {
    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let field_count = self.fields().len() as u16;
        let [column] = Layout::horizontal([Constraint::Length(50)])
            .flex(Flex::Center)
            .areas(area);
        let [form] = Layout::vertical([Constraint::Length(4 + field_count * 3 + 3)])
            .flex(Flex::Center)
            .areas(column);

        let mut constraints = vec![Constraint::Length(3)];
        constraints.extend((0..field_count).map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Length(2));
        constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(form);

        let heading = match self.mode {
            Mode::SignIn => "Sign in to tunelink",
            Mode::Register => "Create a tunelink account",
        };
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    heading,
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Tab: next field · Enter: submit · Ctrl+R: switch sign in / register",
                    Style::default().fg(colors::MUTED),
                )),
            ])
            .centered(),
            rows[0],
        );

        for (i, field) in self.fields().into_iter().enumerate() {
            f.render_widget(field, rows[i + 1]);
        }

        let status = if self.submitting {
            Span::styled("Signing in…", Style::default().fg(colors::MUTED))
        } else if let Some(error) = &self.error {
            Span::styled(error.clone(), Style::default().fg(colors::ERROR))
        } else {
            Span::raw("")
        };
        f.render_widget(
            Paragraph::new(Line::from(status)).centered(),
            rows[field_count as usize + 1],
        );
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.submitting {
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_mode()
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Enter => {
                if self.focus + 1 < self.fields().len() {
                    self.move_focus(1);
                } else if let Some(event) = self.submit() {
                    ctx.send(event);
                }
            }
            _ => {
                let focus = self.focus;
                self.field_mut(focus).handle_key(key);
            }
        }
        Some(Action::None)
    }

    fn handle_paste(&mut self, text: &str) {
        let focus = self.focus;
        self.field_mut(focus).paste(text);
    }

    async fn on_event(&mut self, event: &Event, _state: &AppState, _ctx: &AppContext) {
        if let Event::AuthFailed(message) = event {
            self.submitting = false;
            self.error = Some(message.clone());
        }
    }

    fn is_fullscreen(&self) -> bool {
        true
    }

    fn captures_text(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(login: &mut Login, text: &str) {
        let focus = login.focus;
        login.field_mut(focus).paste(text);
    }

    #[test]
    fn sign_in_requires_email_and_password() {
        let mut login = Login::default();
        assert!(login.submit().is_none());
        assert!(login.error.is_some());

        type_into(&mut login, "ana@example.com");
        login.move_focus(1);
        type_into(&mut login, "hunter2");

        match login.submit() {
            Some(Event::Login { email, password }) => {
                assert_eq!(email, "ana@example.com");
                assert_eq!(password, "hunter2");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(login.submitting);
    }

    #[test]
    fn register_needs_a_username() {
        let mut login = Login::default();
        login.toggle_mode();
        login.move_focus(1);
        type_into(&mut login, "ana@example.com");
        login.move_focus(1);
        type_into(&mut login, "hunter2");
        assert!(login.submit().is_none());

        login.move_focus(1);
        type_into(&mut login, "ana");
        assert!(matches!(login.submit(), Some(Event::Register { .. })));
    }
}
