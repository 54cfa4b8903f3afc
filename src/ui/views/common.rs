use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    model::Playlist,
    ui::components::spinner::Spinner,
    util::{colors, text::plural, text::truncate},
};

pub fn playlist_item(playlist: &Playlist, width: u16) -> ListItem<'static> {
    let gradient = playlist.gradient();
    let swatch = colors::parse_hex(&gradient.from).unwrap_or(colors::PRIMARY);

    let mut flags = String::new();
    if playlist.is_liked {
        flags.push_str(" ♥");
    }
    if playlist.is_saved {
        flags.push_str(" ★");
    }

    let meta = format!(
        "{} · {} · {}",
        playlist.owner.username,
        plural(playlist.song_count(), "song", "songs"),
        plural(playlist.likes_count, "like", "likes"),
    );

    let title_width = (width as usize).saturating_sub(meta.len() + flags.len() + 8);

    ListItem::new(Line::from(vec![
        Span::styled("▌ ", Style::default().fg(swatch)),
        Span::styled(
            truncate(&playlist.title, title_width.max(8)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(flags, Style::default().fg(colors::ACCENT)),
        Span::styled(format!("  {meta}"), Style::default().fg(colors::MUTED)),
    ]))
}

pub fn render_list(f: &mut Frame, area: Rect, items: Vec<ListItem>, list_state: &mut ListState) {
    if !items.is_empty() && list_state.selected().is_none() {
        list_state.select(Some(0));
    }

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}

pub fn render_loading(f: &mut Frame, area: Rect, label: &str) {
    let spinner = Spinner::default()
        .with_style(Style::default().fg(colors::PRIMARY))
        .with_label(label);
    f.render_widget(spinner, area);
}

pub fn render_empty(f: &mut Frame, area: Rect, text: &str) {
    let y = area.y + area.height / 2;
    let line = Rect::new(area.x, y, area.width, 1.min(area.height));
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(colors::MUTED))
            .alignment(Alignment::Center),
        line,
    );
}

pub fn title_line(title: &str, hint: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            title.to_string(),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {hint}"), Style::default().fg(colors::MUTED)),
    ])
}

/// Centered rectangle of at most `width` x `height` inside `area`.
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(popup_area(area, 60, 10), Rect::new(20, 15, 60, 10));
        assert_eq!(popup_area(Rect::new(5, 5, 20, 4), 60, 10), Rect::new(5, 5, 20, 4));
    }
}
