use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Widget},
};

use crate::util::colors;

pub struct SidebarEntry<'a> {
    pub label: &'a str,
    pub badge: Option<u32>,
}

pub struct Sidebar<'a> {
    items: Vec<SidebarEntry<'a>>,
    selected_index: usize,
}

impl<'a> Sidebar<'a> {
    pub fn new(items: Vec<SidebarEntry<'a>>, selected_index: usize) -> Self {
        Self {
            items,
            selected_index,
        }
    }
}

impl<'a> Widget for Sidebar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected_index {
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors::MUTED)
                };
                let mut spans = vec![Span::styled(format!(" {} {}", i + 1, item.label), style)];
                if let Some(count) = item.badge.filter(|c| *c > 0) {
                    let badge = if count > 99 {
                        "99+".to_string()
                    } else {
                        count.to_string()
                    };
                    spans.push(Span::styled(
                        format!(" ({badge})"),
                        Style::default().fg(colors::ACCENT),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        List::new(items).render(area, buf);
    }
}
