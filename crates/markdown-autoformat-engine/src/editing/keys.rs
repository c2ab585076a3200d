//! Platform-independent key events and formatting hotkeys

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable character other than space
    Char(char),
    Space,
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl Key {
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Key::Space,
            '\n' | '\r' => Key::Enter,
            '\t' => Key::Tab,
            c => Key::Char(c),
        }
    }

    /// Text the key inserts when handled as ordinary input
    pub fn text(&self) -> Option<char> {
        match self {
            Key::Char(c) => Some(*c),
            Key::Space => Some(' '),
            Key::Enter => Some('\n'),
            Key::Tab => Some('\t'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    /// The platform command modifier: Ctrl or Cmd/Meta
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// No command or alt modifier; shift is allowed since it only changes case.
    pub fn is_plain(&self) -> bool {
        !self.modifiers.command() && !self.modifiers.alt
    }
}

/// Commands bound to hotkeys, independent of prefix autoformatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatCommand {
    ToggleMark(Mark),
    ToggleCodeBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyParseError {
    #[error("hotkey {0:?} has no key")]
    MissingKey(String),
    #[error("hotkey {0:?} names more than one key")]
    MultipleKeys(String),
    #[error("unknown key {key:?} in hotkey {hotkey:?}")]
    UnknownKey { hotkey: String, key: String },
}

/// A key combination such as `mod+b` or `ctrl+shift+x`.
///
/// `mod` accepts either Ctrl or Meta, so one binding works on every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub key: Key,
    pub command: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Hotkey {
    /// `mod+<key>`
    pub fn command(key: Key) -> Self {
        Self {
            key,
            command: true,
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let key_matches = match (self.key, event.key) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        };
        let m = event.modifiers;
        let command_matches = if self.command {
            m.command()
        } else {
            m.ctrl == self.ctrl && m.meta == self.meta
        };
        key_matches && command_matches && m.shift == self.shift && m.alt == self.alt
    }
}

fn parse_key(hotkey: &str, name: &str) -> Result<Key, HotkeyParseError> {
    let key = match name {
        "enter" | "return" => Key::Enter,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "escape" | "esc" => Key::Escape,
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::from_char(c),
                _ => {
                    return Err(HotkeyParseError::UnknownKey {
                        hotkey: hotkey.to_string(),
                        key: name.to_string(),
                    });
                }
            }
        }
    };
    Ok(key)
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut command, mut ctrl, mut meta, mut shift, mut alt) = (false, false, false, false, false);
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "mod" => command = true,
                "ctrl" | "control" => ctrl = true,
                "meta" | "cmd" | "command" | "super" => meta = true,
                "shift" => shift = true,
                "alt" | "option" | "opt" => alt = true,
                name => {
                    if key.is_some() {
                        return Err(HotkeyParseError::MultipleKeys(s.to_string()));
                    }
                    key = Some(parse_key(s, name)?);
                }
            }
        }

        Ok(Hotkey {
            key: key.ok_or_else(|| HotkeyParseError::MissingKey(s.to_string()))?,
            command,
            ctrl,
            meta,
            shift,
            alt,
        })
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command {
            write!(f, "Mod+")?;
        }
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.meta {
            write!(f, "Meta+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Hotkey to formatting command table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<(Hotkey, FormatCommand)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::empty()
            .bind(Hotkey::command(Key::Char('b')), FormatCommand::ToggleMark(Mark::Bold))
            .bind(Hotkey::command(Key::Char('i')), FormatCommand::ToggleMark(Mark::Italic))
            .bind(
                Hotkey::command(Key::Char('x')).with_shift(),
                FormatCommand::ToggleMark(Mark::Strikethrough),
            )
            .bind(Hotkey::command(Key::Char('`')), FormatCommand::ToggleCodeBlock)
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind a hotkey, replacing any earlier binding for the same command.
    pub fn bind(mut self, hotkey: Hotkey, command: FormatCommand) -> Self {
        self.bindings.retain(|(_, bound)| *bound != command);
        self.bindings.push((hotkey, command));
        self
    }

    /// Build from `(hotkey string, command)` pairs, e.g. from a config file
    pub fn parse<'a>(
        bindings: impl IntoIterator<Item = (&'a str, FormatCommand)>,
    ) -> Result<Self, HotkeyParseError> {
        bindings
            .into_iter()
            .try_fold(Self::empty(), |keymap, (hotkey, command)| {
                Ok(keymap.bind(hotkey.parse()?, command))
            })
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<FormatCommand> {
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.matches(event))
            .map(|(_, command)| *command)
    }

    pub fn bindings(&self) -> &[(Hotkey, FormatCommand)] {
        &self.bindings
    }
}
