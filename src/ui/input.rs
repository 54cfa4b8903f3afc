use crate::ui::message::AppMessage;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key(key: KeyEvent) -> Option<AppMessage> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppMessage::Quit),
            (KeyCode::Char('Q'), _) => Some(AppMessage::Quit),
            (KeyCode::Char(' '), _) => Some(AppMessage::TogglePlayPause),
            (KeyCode::Char('n'), _) => Some(AppMessage::NextTrack),
            (KeyCode::Char('p'), _) => Some(AppMessage::PreviousTrack),
            (KeyCode::Char('+'), _) => Some(AppMessage::VolumeUp),
            (KeyCode::Char('='), _) => Some(AppMessage::VolumeUp),
            (KeyCode::Char('-'), _) => Some(AppMessage::VolumeDown),
            (KeyCode::Char('H'), _) => Some(AppMessage::SeekBackward),
            (KeyCode::Char('L'), _) => Some(AppMessage::SeekForward),
            (KeyCode::Char('r'), _) => Some(AppMessage::ToggleRepeat),
            (KeyCode::Char('z'), _) => Some(AppMessage::ToggleShuffle),
            (KeyCode::Char('m'), _) => Some(AppMessage::ToggleMute),
            (KeyCode::Char('o'), _) => Some(AppMessage::OpenCurrentExternally),
            (KeyCode::Char('x'), _) => Some(AppMessage::DismissToasts),
            (KeyCode::Esc, _) | (KeyCode::Backspace, _) => Some(AppMessage::GoBack),
            (KeyCode::Tab, _) => Some(AppMessage::NextSidebarItem),
            (KeyCode::BackTab, _) => Some(AppMessage::PreviousSidebarItem),
            (KeyCode::Char(c @ '1'..='7'), _) => {
                Some(AppMessage::SetSidebarIndex(c as usize - '1' as usize))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_select_sidebar_entries() {
        assert!(matches!(
            InputHandler::handle_key(key(KeyCode::Char('1'))),
            Some(AppMessage::SetSidebarIndex(0))
        ));
        assert!(matches!(
            InputHandler::handle_key(key(KeyCode::Char('7'))),
            Some(AppMessage::SetSidebarIndex(6))
        ));
        assert!(InputHandler::handle_key(key(KeyCode::Char('8'))).is_none());
    }

    #[test]
    fn ctrl_c_quits() {
        let evt = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(
            InputHandler::handle_key(evt),
            Some(AppMessage::Quit)
        ));
    }
}
