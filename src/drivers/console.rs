use std::fmt;
use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{
    self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{Command, execute, queue};

use super::{SizeProvider, TerminalControl};

/// Turns on X10 mouse reporting (`CSI ?1000h`).
///
/// crossterm's `EnableMouseCapture` also switches on SGR and urxvt
/// encodings, which report coordinates in a format the X10 decoder does not
/// read, so the plain mode is requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnableX10Mouse;

impl Command for EnableX10Mouse {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[?1000h")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::other("X10 mouse reporting requires an ANSI terminal"))
    }
}

/// Turns off X10 mouse reporting (`CSI ?1000l`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisableX10Mouse;

impl Command for DisableX10Mouse {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[?1000l")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        Err(io::Error::other("X10 mouse reporting requires an ANSI terminal"))
    }
}

/// crossterm-backed terminal control writing to `W` (stdout by default).
///
/// Output is queued and only reaches the terminal on [`TerminalControl::flush`].
/// Dropping a terminal whose raw mode is still active restores it.
pub struct ConsoleTerminal<W: Write = Stdout> {
    out: W,
    raw: bool,
}

impl ConsoleTerminal<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleTerminal<W> {
    pub fn new(out: W) -> Self {
        Self { out, raw: false }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_writer(mut self) -> W
    where
        W: Default,
    {
        std::mem::take(&mut self.out)
    }
}

impl<W: Write> TerminalControl for ConsoleTerminal<W> {
    fn enter_alt_screen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, DisableLineWrap)
    }

    fn leave_alt_screen(&mut self) -> io::Result<()> {
        queue!(self.out, EnableLineWrap, LeaveAlternateScreen)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Hide)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Show)
    }

    fn set_raw_mode(&mut self) -> io::Result<()> {
        if !self.raw {
            terminal::enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        if self.raw {
            terminal::disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }

    fn enable_mouse_reporting(&mut self) -> io::Result<()> {
        queue!(self.out, EnableX10Mouse)
    }

    fn disable_mouse_reporting(&mut self) -> io::Result<()> {
        queue!(self.out, DisableX10Mouse)
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(x.saturating_sub(1), y.saturating_sub(1))
        )
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for ConsoleTerminal<W> {
    fn drop(&mut self) {
        if self.raw {
            let _ = self.exit();
        }
    }
}

/// Size provider backed by `crossterm::terminal::size`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSize;

impl SizeProvider for ConsoleSize {
    fn current_size(&mut self) -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

/// Restores the controlling terminal without any handle to it.
///
/// Used from the signal and panic paths; every step is attempted even if an
/// earlier one fails.
pub fn best_effort_restore() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableX10Mouse);
    let _ = execute!(stdout, Show);
    let _ = execute!(stdout, EnableLineWrap, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}
