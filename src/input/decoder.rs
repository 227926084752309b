//! Byte-level state machine for xterm/VT100 input sequences.
//!
//! Recognises plain bytes, the C0 controls BEL..CR, `CSI` cursor/editing
//! keys, `SS3` navigation/function keys and X10 mouse reports. Anything the
//! decoder does not understand is dropped and the machine resynchronises to
//! the ground state, so a malformed sequence never produces a partial event.

use super::{ByteSource, ControlKey, InputError, InputEvent, Key, MouseEvent, MouseKind};
use crate::constants::{MAX_CSI_PARAMS, X10_OFFSET};

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Ground,
    Escape,
    Csi,
    Ss3,
    /// `CSI M` seen; waiting for the button byte.
    MouseButton,
    MouseColumn {
        button: u8,
    },
    MouseRow {
        button: u8,
        x: u16,
    },
}

#[derive(Debug, Default)]
pub struct EventDecoder {
    state: State,
    params: Vec<u16>,
    /// Digits accumulated for the parameter currently being read.
    pending: Option<u16>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no sequence is partially consumed.
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Parameters collected for the CSI sequence in flight.
    pub fn params(&self) -> &[u16] {
        &self.params
    }

    /// Pulls bytes from `source` until one complete event is decoded.
    pub fn next_event<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<InputEvent, InputError> {
        loop {
            let byte = source.next_byte()?;
            if let Some(event) = self.advance(byte) {
                return Ok(event);
            }
        }
    }

    /// Feeds one byte into the state machine.
    pub fn advance(&mut self, byte: u8) -> Option<InputEvent> {
        match self.state {
            State::Ground => self.ground(byte),
            State::Escape => {
                self.escape(byte);
                None
            }
            State::Csi => self.csi(byte),
            State::Ss3 => {
                self.state = State::Ground;
                ss3_key(byte).map(InputEvent::KeyPress)
            }
            State::MouseButton => {
                self.state = State::MouseColumn { button: byte };
                None
            }
            State::MouseColumn { button } => {
                self.state = State::MouseRow {
                    button,
                    x: x10_coordinate(byte),
                };
                None
            }
            State::MouseRow { button, x } => {
                self.state = State::Ground;
                let y = x10_coordinate(byte);
                match MouseKind::from_button(button) {
                    Some(kind) => Some(InputEvent::Mouse(MouseEvent { kind, x, y })),
                    None => {
                        tracing::trace!(button = format_args!("{button:#x}"), x, y, "unknown mouse button");
                        None
                    }
                }
            }
        }
    }

    fn ground(&mut self, byte: u8) -> Option<InputEvent> {
        if byte == ESC {
            self.enter_escape();
            return None;
        }
        if let Some(control) = ControlKey::from_byte(byte) {
            tracing::trace!(control = %control, "control byte");
            return Some(InputEvent::Control(control));
        }
        Some(InputEvent::KeyPress(Key::Char(char::from(byte))))
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.params.clear();
        self.pending = None;
    }

    fn escape(&mut self, byte: u8) {
        match byte {
            b'[' => self.state = State::Csi,
            b'O' => self.state = State::Ss3,
            ESC => self.enter_escape(),
            other => {
                tracing::trace!(byte = format_args!("{other:#x}"), "unrecognised escape sequence");
                self.state = State::Ground;
            }
        }
    }

    fn csi(&mut self, byte: u8) -> Option<InputEvent> {
        match byte {
            b'0'..=b'9' => {
                let digit = u16::from(byte - b'0');
                let value = self.pending.unwrap_or(0);
                self.pending = Some(value.saturating_mul(10).saturating_add(digit));
                None
            }
            0x3a..=0x3f => {
                let value = self.pending.take().unwrap_or(0);
                self.push_param(value);
                None
            }
            0x40..=0x7e => {
                if let Some(value) = self.pending.take() {
                    self.push_param(value);
                }
                if byte == b'M' {
                    self.state = State::MouseButton;
                    return None;
                }
                self.state = State::Ground;
                self.resolve_csi(byte)
            }
            ESC => {
                tracing::trace!("escape inside CSI, restarting sequence");
                self.enter_escape();
                None
            }
            // Intermediates and stray controls do not affect the sequence.
            _ => None,
        }
    }

    fn push_param(&mut self, value: u16) {
        if self.params.len() < MAX_CSI_PARAMS {
            self.params.push(value);
        } else {
            tracing::trace!(value, "dropping excess CSI parameter");
        }
    }

    fn resolve_csi(&self, final_byte: u8) -> Option<InputEvent> {
        let key = match final_byte {
            b'A' => Key::Up,
            b'B' => Key::Down,
            b'C' => Key::Right,
            b'D' => Key::Left,
            b'F' => Key::End,
            b'H' => Key::Home,
            b'J' => return Some(InputEvent::ClearScreen),
            b'K' => return Some(InputEvent::ClearLine),
            b'~' => tilde_key(self.params.first().copied().unwrap_or(0)),
            other => {
                tracing::trace!(
                    final_byte = format_args!("{:?}", char::from(other)),
                    params = ?self.params,
                    "unrecognised CSI sequence"
                );
                return None;
            }
        };
        Some(InputEvent::KeyPress(key))
    }
}

fn ss3_key(byte: u8) -> Option<Key> {
    match byte {
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        b'P' => Some(Key::Function(1)),
        b'Q' => Some(Key::Function(2)),
        b'R' => Some(Key::Function(3)),
        b'S' => Some(Key::Function(4)),
        _ => None,
    }
}

/// Resolves the first parameter of a `CSI n ~` sequence.
pub fn tilde_key(param: u16) -> Key {
    match param {
        1 => Key::Home,
        3 => Key::Delete,
        4 => Key::End,
        5 => Key::PageUp,
        6 => Key::PageDown,
        11..=15 => Key::Function((param - 10) as u8),
        17..=21 => Key::Function((param - 11) as u8),
        23 | 24 => Key::Function((param - 12) as u8),
        other => Key::Special(other),
    }
}

fn x10_coordinate(byte: u8) -> u16 {
    u16::from(byte.saturating_sub(X10_OFFSET))
}
