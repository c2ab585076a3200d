//! Terminal key events to engine key events, and the configured keymap.

use crossterm::event::{KeyCode, KeyEvent as TermKeyEvent, KeyModifiers};
use markdown_autoformat_config::HotkeyBindings;
use markdown_autoformat_engine::{
    FormatCommand, HotkeyParseError, Key, KeyEvent, Keymap, Mark, Modifiers,
};

/// Convert a crossterm key event; keys the editor has no use for map to `None`.
pub fn to_engine_event(event: &TermKeyEvent) -> Option<KeyEvent> {
    let m = event.modifiers;
    let mut modifiers = Modifiers {
        ctrl: m.contains(KeyModifiers::CONTROL),
        meta: m.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        shift: m.contains(KeyModifiers::SHIFT),
        alt: m.contains(KeyModifiers::ALT),
    };
    let key = match event.code {
        KeyCode::Char(c) => Key::from_char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            modifiers.shift = true;
            Key::Tab
        }
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    Some(KeyEvent::new(key, modifiers))
}

pub fn keymap_from_config(hotkeys: &HotkeyBindings) -> Result<Keymap, HotkeyParseError> {
    Keymap::parse([
        (hotkeys.bold.as_str(), FormatCommand::ToggleMark(Mark::Bold)),
        (hotkeys.italic.as_str(), FormatCommand::ToggleMark(Mark::Italic)),
        (
            hotkeys.strikethrough.as_str(),
            FormatCommand::ToggleMark(Mark::Strikethrough),
        ),
        (hotkeys.code_block.as_str(), FormatCommand::ToggleCodeBlock),
    ])
}
