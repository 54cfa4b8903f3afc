pub mod handler;

use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::widgets::ListState;

/// Pulsing marker for the song that is currently playing.
pub fn get_active_track_icon(is_playing: bool) -> &'static str {
    if !is_playing {
        return "•";
    }

    const FRAME_STEP_MS: u128 = 100;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    match (now / FRAME_STEP_MS) % 6 {
        1 | 4 => "•",
        2 | 3 => "●",
        _ => "·",
    }
}

/// Moves a list selection by `delta`, clamped to `len`.
pub fn step_selection(list_state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        list_state.select(None);
        return;
    }
    let current = list_state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    list_state.select(Some(next as usize));
}

/// True once the selection is close enough to the end to fetch another page.
pub fn near_end(list_state: &ListState, len: usize) -> bool {
    list_state
        .selected()
        .is_some_and(|i| len > 0 && i + 3 >= len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_clamped() {
        let mut state = ListState::default();
        step_selection(&mut state, 3, 1);
        assert_eq!(state.selected(), Some(1));
        step_selection(&mut state, 3, 10);
        assert_eq!(state.selected(), Some(2));
        step_selection(&mut state, 3, -10);
        assert_eq!(state.selected(), Some(0));
        step_selection(&mut state, 0, 1);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn near_end_triggers_in_last_rows() {
        let mut state = ListState::default();
        state.select(Some(6));
        assert!(near_end(&state, 9));
        state.select(Some(2));
        assert!(!near_end(&state, 9));
    }
}
