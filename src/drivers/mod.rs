//! Collaborator interfaces used by the compositor and main loop.
//!
//! The core never talks to the terminal directly: painting and mode changes
//! go through [`TerminalControl`], size queries through [`SizeProvider`] and
//! decoded input arrives via an [`InputDriver`].

pub mod channel;
pub mod console;

use std::io;
use std::time::Duration;

use crate::input::{InputError, InputEvent};

pub trait InputDriver {
    /// Waits up to `timeout` for an event; `Ok(true)` means `read` will not block.
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError>;
    fn read(&mut self) -> Result<InputEvent, InputError>;
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> Result<InputEvent, InputError> {
        (**self).read()
    }
}

pub trait SizeProvider {
    /// Current terminal size as `(width, height)` in cells.
    fn current_size(&mut self) -> io::Result<(u16, u16)>;
}

impl<T: SizeProvider + ?Sized> SizeProvider for &mut T {
    fn current_size(&mut self) -> io::Result<(u16, u16)> {
        (**self).current_size()
    }
}

/// Terminal mode switches and cursor-addressed output.
///
/// Coordinates passed to [`TerminalControl::move_cursor`] are 1-based, the
/// same convention the mouse decoder and window bounds use.
pub trait TerminalControl {
    fn enter_alt_screen(&mut self) -> io::Result<()>;
    fn leave_alt_screen(&mut self) -> io::Result<()>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn show_cursor(&mut self) -> io::Result<()>;
    fn set_raw_mode(&mut self) -> io::Result<()>;
    fn restore_mode(&mut self) -> io::Result<()>;
    fn enable_mouse_reporting(&mut self) -> io::Result<()>;
    fn disable_mouse_reporting(&mut self) -> io::Result<()>;
    fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()>;
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;

    /// Puts the terminal into the state the compositor paints into.
    fn enter(&mut self, mouse_reporting: bool) -> io::Result<()> {
        self.enter_alt_screen()?;
        self.set_raw_mode()?;
        self.hide_cursor()?;
        if mouse_reporting {
            self.enable_mouse_reporting()?;
        }
        self.flush()
    }

    /// Undoes [`TerminalControl::enter`].
    fn exit(&mut self) -> io::Result<()> {
        self.restore_mode()?;
        self.show_cursor()?;
        self.disable_mouse_reporting()?;
        self.leave_alt_screen()?;
        self.flush()
    }
}
