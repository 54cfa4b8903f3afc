use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::{
    audio::{enums::RepeatMode, progress::TrackProgress, state::PlaybackState},
    util::{colors, text::format_duration},
};

pub struct PlayerWidget<'a> {
    state: &'a PlaybackState,
    progress: &'a TrackProgress,
    repeat_mode: RepeatMode,
    shuffle: bool,
    volume: u8,
}

impl<'a> PlayerWidget<'a> {
    pub fn new(
        state: &'a PlaybackState,
        progress: &'a TrackProgress,
        repeat_mode: RepeatMode,
        shuffle: bool,
        volume: u8,
    ) -> Self {
        Self {
            state,
            progress,
            repeat_mode,
            shuffle,
            volume,
        }
    }

    fn title(&self) -> String {
        let icon = match self.state {
            PlaybackState::Playing(_) => "▶",
            PlaybackState::Paused(_) => "⏸",
            PlaybackState::Buffering(_) => "…",
            PlaybackState::External(_) => "↗",
            PlaybackState::Stopped | PlaybackState::Error(_) => "■",
        };

        match (self.state, self.state.song()) {
            (PlaybackState::External(_), Some(song)) => format!(
                " {icon} {} by {} · {} (press o to open) ",
                song.title,
                song.artist(),
                song.platform().label()
            ),
            (_, Some(song)) => format!(" {icon} {} by {} ", song.title, song.artist()),
            (PlaybackState::Error(message), None) => format!(" {icon} {message} "),
            _ => format!(" {icon} Nothing playing "),
        }
    }
}

impl<'a> Widget for PlayerWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(8), Constraint::Length(12)])
            .split(area);

        let (current, total) = self.progress.get_progress();
        let label = format!(
            "{} / {}",
            format_duration(current / 1000),
            format_duration(total / 1000)
        );

        Gauge::default()
            .block(
                Block::default()
                    .title_top(self.title())
                    .borders(Borders::ALL)
                    .border_set(border::Set {
                        top_right: symbols::line::ROUNDED.horizontal_down,
                        bottom_right: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .gauge_style(Style::new().fg(colors::PRIMARY).bg(colors::SECONDARY))
            .ratio(self.progress.ratio())
            .label(Span::raw(label).fg(colors::MUTED))
            .use_unicode(true)
            .render(layout[0], buf);

        let repeat = match self.repeat_mode {
            RepeatMode::None => "R".fg(colors::NEUTRAL),
            RepeatMode::All => "R".fg(colors::PRIMARY),
            RepeatMode::Single => "1".fg(colors::PRIMARY),
        };
        let shuffle = if self.shuffle {
            "S".fg(colors::PRIMARY)
        } else {
            "S".fg(colors::NEUTRAL)
        };

        Paragraph::new(Line::from(vec![repeat, "  ".into(), shuffle]))
            .block(
                Block::default()
                    .borders(Borders::TOP | Borders::BOTTOM)
                    .border_set(border::Set {
                        top_left: symbols::line::ROUNDED.horizontal_down,
                        bottom_left: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .centered()
            .render(layout[1], buf);

        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::Set {
                        top_left: symbols::line::ROUNDED.horizontal_down,
                        bottom_left: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .gauge_style(Style::new().fg(colors::PRIMARY).bg(colors::NEUTRAL))
            .ratio(f64::from(self.volume.min(100)) / 100.0)
            .label(format!("{}%", self.volume))
            .render(layout[2], buf);
    }
}
