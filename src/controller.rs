use std::time::Duration;
use tracing::trace;

use crate::domain::{DashConfig, Message, Result};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            let message = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        Some(Message::RawKey(key))
                    } else {
                        Self::handle_key(key)
                    }
                }
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            };
            return Ok(message);
        }
        Ok(None)
    }

    pub fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char(c @ '1'..='4'), _) => {
                Some(Message::SelectMode(c as usize - '1' as usize))
            }
            (KeyCode::Tab, _) | (KeyCode::Char('l'), _) => Some(Message::NextMode),
            (KeyCode::BackTab, _) | (KeyCode::Char('h'), _) => Some(Message::PreviousMode),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char('o'), _) | (KeyCode::Char(':'), _) => Some(Message::OpenFile),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<Message> {
        Controller::handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn digits_select_modes() {
        assert!(matches!(press(KeyCode::Char('1')), Some(Message::SelectMode(0))));
        assert!(matches!(press(KeyCode::Char('4')), Some(Message::SelectMode(3))));
        assert!(press(KeyCode::Char('5')).is_none());
    }

    #[test]
    fn navigation_keys() {
        assert!(matches!(press(KeyCode::Tab), Some(Message::NextMode)));
        assert!(matches!(press(KeyCode::BackTab), Some(Message::PreviousMode)));
        assert!(matches!(press(KeyCode::Char('o')), Some(Message::OpenFile)));
        assert!(matches!(press(KeyCode::Char('q')), Some(Message::Quit)));
    }
}
