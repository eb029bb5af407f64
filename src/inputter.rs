use std::path::PathBuf;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::domain::{DashError, Result};

/// Single line editor used for the file path prompt.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub cursor_pos: usize,
}

impl InputResult {
    /// Expands `~` and environment variables in the entered path.
    pub fn expanded_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(self.input.trim())
            .map_err(|e| DashError::PathExpansion(e.to_string()))?;
        trace!("Expanded {:?} to {:?}", self.input, expanded);
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.move_to(0),
            (KeyCode::End, _) => self.move_to(self.len()),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.current_input.clear();
                self.move_to(0)
            }
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => self.insert(chr),
            _ => self.get(),
        }
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            cursor_pos: self.cursor_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.cursor_pos = 0;
    }

    fn len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let pos = self.byte_pos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.cursor_pos < self.len() {
            let pos = self.byte_pos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.move_to(self.cursor_pos.saturating_sub(1))
    }

    fn right(&mut self) -> InputResult {
        self.move_to(self.cursor_pos + 1)
    }

    fn move_to(&mut self, pos: usize) -> InputResult {
        self.cursor_pos = pos.min(self.len());
        self.get()
    }

    fn insert(&mut self, chr: char) -> InputResult {
        let pos = self.byte_pos();
        self.current_input.insert(pos, chr);
        self.cursor_pos += 1;
        self.get()
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) {
        for c in s.chars() {
            input.read(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn edits_in_the_middle() {
        let mut input = Inputter::default();
        type_str(&mut input, "vgales.csv");
        for _ in 0.."ales.csv".len() {
            input.read(key(KeyCode::Left));
        }
        input.read(key(KeyCode::Char('s')));
        let result = input.read(key(KeyCode::Enter));
        assert_eq!(result.input, "vgsales.csv");
        assert!(result.finished);
        assert!(!result.canceled);
    }

    #[test]
    fn backspace_handles_multibyte_chars() {
        let mut input = Inputter::default();
        type_str(&mut input, "añ");
        let result = input.read(key(KeyCode::Backspace));
        assert_eq!(result.input, "a");
        assert_eq!(result.cursor_pos, 1);
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut input = Inputter::default();
        type_str(&mut input, "data.csv");
        let result = input.read(key(KeyCode::Esc));
        assert!(result.canceled);
        assert!(result.finished);
        assert!(result.input.is_empty());
    }

    #[test]
    fn expanded_path_trims_and_reports_unknown_variables() {
        let plain = InputResult {
            input: "  data/sales.csv ".into(),
            ..Default::default()
        };
        assert_eq!(plain.expanded_path().unwrap(), PathBuf::from("data/sales.csv"));

        let unknown = InputResult {
            input: "$VGDASH_UNSET_TEST_VARIABLE/sales.csv".into(),
            ..Default::default()
        };
        assert!(matches!(
            unknown.expanded_path(),
            Err(DashError::PathExpansion(_))
        ));
    }
}
