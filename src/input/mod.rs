// src/input/mod.rs

//! Keyboard control.
//!
//! [`KEY_BINDINGS`] is the only place keys are mapped to [`Command`]s; both
//! the dispatcher and the help footer read from it.

pub mod keyboard;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::Command;

pub use keyboard::{spawn_keyboard_reader, RawModeGuard};

/// One entry of the key map.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub command: Command,
    /// How the key is shown in the help footer.
    pub label: &'static str,
}

pub const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        code: KeyCode::Char('b'),
        modifiers: KeyModifiers::NONE,
        command: Command::Rebuild,
        label: "b",
    },
    KeyBinding {
        code: KeyCode::Char('o'),
        modifiers: KeyModifiers::NONE,
        command: Command::OpenRuntime,
        label: "o",
    },
    KeyBinding {
        code: KeyCode::Char('x'),
        modifiers: KeyModifiers::NONE,
        command: Command::KillRuntime,
        label: "x",
    },
    KeyBinding {
        code: KeyCode::Char('q'),
        modifiers: KeyModifiers::NONE,
        command: Command::Quit,
        label: "q",
    },
    KeyBinding {
        code: KeyCode::Char('c'),
        modifiers: KeyModifiers::CONTROL,
        command: Command::Quit,
        label: "ctrl-c",
    },
];

/// Map a key event to a command; `None` for unbound keys and for
/// release/repeat events. Letters match regardless of Shift or Caps Lock.
pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let (code, modifiers) = fold_case(key);
    KEY_BINDINGS
        .iter()
        .find(|b| b.code == code && b.modifiers == modifiers)
        .map(|b| b.command)
}

fn fold_case(key: &KeyEvent) -> (KeyCode, KeyModifiers) {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => (
            KeyCode::Char(c.to_ascii_lowercase()),
            key.modifiers.difference(KeyModifiers::SHIFT),
        ),
        code => (code, key.modifiers),
    }
}

/// Help footer, e.g. `[b] build  [o] open  [x] kill  [q] quit`.
///
/// Commands bound to several keys are listed once, under their first key.
pub fn help_line() -> String {
    let mut seen: Vec<Command> = Vec::new();
    let mut parts = Vec::new();
    for binding in KEY_BINDINGS {
        if seen.contains(&binding.command) {
            continue;
        }
        seen.push(binding.command);
        parts.push(format!("[{}] {}", binding.label, binding.command.label()));
    }
    parts.join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn bound_keys_map_to_commands() {
        let none = KeyModifiers::NONE;
        assert_eq!(command_for_key(&press(KeyCode::Char('b'), none)), Some(Command::Rebuild));
        assert_eq!(command_for_key(&press(KeyCode::Char('o'), none)), Some(Command::OpenRuntime));
        assert_eq!(command_for_key(&press(KeyCode::Char('x'), none)), Some(Command::KillRuntime));
        assert_eq!(command_for_key(&press(KeyCode::Char('q'), none)), Some(Command::Quit));
        assert_eq!(
            command_for_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn plain_c_and_modified_keys_are_ignored() {
        assert_eq!(command_for_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(
            command_for_key(&press(KeyCode::Char('b'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(command_for_key(&press(KeyCode::Enter, KeyModifiers::NONE)), None);
    }

    #[test]
    fn uppercase_letters_map_like_lowercase() {
        assert_eq!(
            command_for_key(&press(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(Command::Quit)
        );
        // Caps Lock: uppercase without a Shift modifier.
        assert_eq!(
            command_for_key(&press(KeyCode::Char('B'), KeyModifiers::NONE)),
            Some(Command::Rebuild)
        );
        assert_eq!(
            command_for_key(&press(KeyCode::Char('C'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
            Some(Command::Quit)
        );
        assert_eq!(
            command_for_key(&press(KeyCode::Char('X'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
            None
        );
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut key = press(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(command_for_key(&key), None);
    }

    #[test]
    fn help_line_lists_each_command_once() {
        assert_eq!(help_line(), "[b] build  [o] open  [x] kill  [q] quit");
    }
}
