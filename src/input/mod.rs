//! Terminal input decoding.
//!
//! Raw bytes from the terminal are turned into [`InputEvent`]s by the
//! [`decoder::EventDecoder`]. The [`task`] module runs the decoder on its own
//! thread and hands events to the main loop through a bounded queue.

pub mod decoder;
pub mod source;
pub mod task;

use std::fmt;
use std::io;

use thiserror::Error;

pub use decoder::EventDecoder;
pub use source::{ByteReader, ByteSource};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input stream closed")]
    EndOfInput,
    #[error("failed to read terminal input: {0}")]
    Io(#[from] io::Error),
}

/// A single decoded terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(Key),
    /// A recognised C0 control byte (tab, enter, backspace, ...).
    Control(ControlKey),
    ClearScreen,
    ClearLine,
    Mouse(MouseEvent),
}

impl InputEvent {
    /// Screen position carried by pointer events, 1-based.
    pub fn position(&self) -> Option<(u16, u16)> {
        match self {
            InputEvent::Mouse(mouse) => Some((mouse.x, mouse.y)),
            _ => None,
        }
    }

    pub fn is_mouse(&self) -> bool {
        matches!(self, InputEvent::Mouse(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal byte that is not part of an escape sequence.
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
    /// Function key `F1`..=`F12`.
    Function(u8),
    /// A `CSI n ~` sequence with a parameter outside the known table.
    Special(u16),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(ch) => write!(f, "{ch}"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::Delete => f.write_str("delete"),
            Key::PageUp => f.write_str("page-up"),
            Key::PageDown => f.write_str("page-down"),
            Key::Function(n) => write!(f, "F{n}"),
            Key::Special(n) => write!(f, "special char {n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Bell,
    Backspace,
    Tab,
    LineFeed,
    VerticalTab,
    FormFeed,
    CarriageReturn,
}

impl ControlKey {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x07 => Some(ControlKey::Bell),
            0x08 => Some(ControlKey::Backspace),
            0x09 => Some(ControlKey::Tab),
            0x0a => Some(ControlKey::LineFeed),
            0x0b => Some(ControlKey::VerticalTab),
            0x0c => Some(ControlKey::FormFeed),
            0x0d => Some(ControlKey::CarriageReturn),
            _ => None,
        }
    }

    /// Conventional mnemonic, e.g. `BEL` or `CR`.
    pub fn mnemonic(self) -> &'static str {
        match self {
            ControlKey::Bell => "BEL",
            ControlKey::Backspace => "BS",
            ControlKey::Tab => "TAB",
            ControlKey::LineFeed => "LF",
            ControlKey::VerticalTab => "VT",
            ControlKey::FormFeed => "FF",
            ControlKey::CarriageReturn => "CR",
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    /// 1-based column.
    pub x: u16,
    /// 1-based row.
    pub y: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    LeftDown,
    MiddleDown,
    RightDown,
    Release,
    Drag,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

impl MouseKind {
    /// Maps an X10 button byte (already offset by 32) to an event kind.
    pub fn from_button(button: u8) -> Option<Self> {
        match button {
            0x20 => Some(MouseKind::LeftDown),
            0x21 => Some(MouseKind::MiddleDown),
            0x22 => Some(MouseKind::RightDown),
            0x23 => Some(MouseKind::Release),
            0x43 => Some(MouseKind::Drag),
            0x60 => Some(MouseKind::ScrollUp),
            0x61 => Some(MouseKind::ScrollDown),
            0x62 => Some(MouseKind::ScrollLeft),
            0x63 => Some(MouseKind::ScrollRight),
            _ => None,
        }
    }
}
