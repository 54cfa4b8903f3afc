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
    event::events::Event,
    model::{Notification, NotificationKind},
    store::AppState,
    ui::{
        context::AppContext,
        traits::{Action, View},
        util::{near_end, step_selection},
        views::common::{render_empty, render_list, render_loading, title_line},
    },
    util::colors,
};

#[derive(Default)]
pub struct Notifications {
    list_state: ListState,
}

impl Notifications {
    fn selected<'a>(&self, state: &'a AppState) -> Option<&'a Notification> {
        state.data.notifications.items.get(self.list_state.selected()?)
    }
}

fn notification_item(notification: &Notification) -> ListItem<'static> {
    let marker = if notification.is_read { "  " } else { "● " };
    let when = notification
        .created_at
        .map(|t| t.format("%b %d %H:%M").to_string())
        .unwrap_or_default();
    let text_style = if notification.is_read {
        Style::default().fg(colors::MUTED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(colors::ACCENT)),
        Span::styled(notification.text(), text_style),
        Span::styled(format!("  {when}"), Style::default().fg(colors::NEUTRAL)),
    ]))
}

#[async_trait]
impl View for Notifications {
    async fn on_mount(&mut self, _state: &AppState, ctx: &AppContext) {
        ctx.send(Event::RefreshNotifications);
    }

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, _ctx: &AppContext) {
        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

        let title = format!("Notifications ({} unread)", state.data.unread_count);
        f.render_widget(
            Paragraph::new(title_line(&title, "Enter: open · A: mark all read · R: refresh")),
            header,
        );

        let pager = &state.data.notifications;
        if pager.is_empty() {
            if pager.is_loading() {
                render_loading(f, body, "Loading notifications...");
            } else {
                render_empty(f, body, "No notifications yet.");
            }
            return;
        }

        let items: Vec<ListItem> = pager.items.iter().map(notification_item).collect();
        render_list(f, body, items, &mut self.list_state);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        let pager = &state.data.notifications;
        let len = pager.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step_selection(&mut self.list_state, len, 1);
                if pager.has_more() && !pager.is_loading() && near_end(&self.list_state, len) {
                    ctx.send(Event::LoadMoreNotifications);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => step_selection(&mut self.list_state, len, -1),
            KeyCode::Char('A') => ctx.send(Event::MarkAllRead),
            KeyCode::Char('R') => {
                self.list_state.select(None);
                ctx.send(Event::RefreshNotifications);
            }
            KeyCode::Enter => {
                let notification = self.selected(state)?;
                if !notification.is_read {
                    ctx.send(Event::MarkRead(notification.id.clone()));
                }
                match (&notification.playlist_id, notification.kind, &notification.actor) {
                    (Some(playlist), _, _) => ctx.send(Event::OpenPlaylist(playlist.clone())),
                    (None, NotificationKind::Follow, Some(actor)) => {
                        ctx.send(Event::OpenUser(actor.id.clone()))
                    }
                    _ => {}
                }
            }
            _ => return None,
        }
        Some(Action::None)
    }
}
