use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::border,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    store::{Toast, ToastLevel},
    util::colors,
};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

/// Stacks toasts in the top-right corner of `area`, newest at the bottom.
pub struct ToastStack<'a> {
    toasts: &'a [&'a Toast],
}

impl<'a> ToastStack<'a> {
    pub fn new(toasts: &'a [&'a Toast]) -> Self {
        Self { toasts }
    }
}

impl<'a> Widget for ToastStack<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = TOAST_WIDTH.min(area.width);
        let x = area.right().saturating_sub(width + 1);

        for (i, toast) in self.toasts.iter().enumerate() {
            let y = area.y + 1 + i as u16 * TOAST_HEIGHT;
            if y + TOAST_HEIGHT > area.bottom() {
                break;
            }
            let rect = Rect::new(x, y, width, TOAST_HEIGHT);

            let (title, color) = match toast.level {
                ToastLevel::Info => ("Info", colors::NEUTRAL),
                ToastLevel::Success => ("Done", colors::PRIMARY),
                ToastLevel::Error => ("Error", colors::ERROR),
            };

            Clear.render(rect, buf);
            Paragraph::new(toast.message.as_str())
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_set(border::ROUNDED)
                        .border_style(Style::default().fg(color))
                        .title(title),
                )
                .style(Style::default().bg(colors::BACKGROUND))
                .render(rect, buf);
        }
    }
}
