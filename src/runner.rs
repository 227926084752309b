use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::drivers::{InputDriver, SizeProvider, TerminalControl};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::input::InputError;
use crate::window::{WindowManager, WindowMessage};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] InputError),
}

impl RunError {
    /// True when the loop ended because the input stream closed.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, RunError::Input(InputError::EndOfInput))
    }
}

pub trait WindowApp {
    fn windows(&mut self) -> &mut WindowManager;

    /// Receives every routed input event.
    fn handle_message(&mut self, message: WindowMessage) -> ControlFlow;
}

/// Polls the terminal size and repaints when it changed or a redraw was
/// requested. A failed size query keeps the last known size.
///
/// Returns whether a repaint happened.
pub fn refresh_screen<T, S>(
    wm: &mut WindowManager,
    terminal: &mut T,
    size: &mut S,
) -> io::Result<bool>
where
    T: TerminalControl + ?Sized,
    S: SizeProvider + ?Sized,
{
    let resized = match size.current_size() {
        Ok((width, height)) => wm.set_screen_size(width, height),
        Err(err) => {
            tracing::warn!(error = %err, "terminal size query failed, keeping last size");
            false
        }
    };
    let forced = wm.take_redraw();
    if resized || forced {
        wm.render(terminal)?;
        return Ok(true);
    }
    Ok(false)
}

/// Runs the router and redraw loop until the app quits or input ends.
///
/// Each tick polls the size provider and repaints when needed; each decoded
/// event is routed through [`WindowManager::route`] (hit-testing and raising
/// on pointer events) before the app sees it.
pub fn run_window_app<A, T, S, D>(
    app: &mut A,
    terminal: &mut T,
    size: &mut S,
    driver: D,
    poll_interval: Duration,
) -> Result<(), RunError>
where
    A: WindowApp + ?Sized,
    T: TerminalControl + ?Sized,
    S: SizeProvider + ?Sized,
    D: InputDriver,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    app.windows().request_redraw();

    event_loop.run(|event| {
        let Some(event) = event else {
            refresh_screen(app.windows(), terminal, size)?;
            return Ok(ControlFlow::Continue);
        };
        let message = app.windows().route(event);
        tracing::trace!(?message, "routed input");
        Ok(app.handle_message(message))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, Key, MouseEvent, MouseKind};
    use crate::window::{Bounds, Window};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct CountingTerminal {
        frames: usize,
    }

    impl TerminalControl for CountingTerminal {
        fn enter_alt_screen(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn leave_alt_screen(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn hide_cursor(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn show_cursor(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn set_raw_mode(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn restore_mode(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn enable_mouse_reporting(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn disable_mouse_reporting(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn move_cursor(&mut self, _x: u16, _y: u16) -> io::Result<()> {
            Ok(())
        }
        fn write_str(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }
        fn flush(&mut self) -> io::Result<()> {
            self.frames += 1;
            Ok(())
        }
    }

    struct SizeScript {
        sizes: VecDeque<io::Result<(u16, u16)>>,
        last: (u16, u16),
    }

    impl SizeProvider for SizeScript {
        fn current_size(&mut self) -> io::Result<(u16, u16)> {
            match self.sizes.pop_front() {
                Some(Ok(size)) => {
                    self.last = size;
                    Ok(size)
                }
                Some(Err(err)) => Err(err),
                None => Ok(self.last),
            }
        }
    }

    #[test]
    fn refresh_renders_on_resize_and_force_only() {
        let mut wm = WindowManager::new(80, 24);
        let mut term = CountingTerminal::default();
        let mut size = SizeScript {
            sizes: VecDeque::from([Ok((80, 24)), Ok((80, 24)), Ok((100, 30))]),
            last: (100, 30),
        };
        // Initial redraw request from construction.
        assert!(refresh_screen(&mut wm, &mut term, &mut size).unwrap());
        assert!(!refresh_screen(&mut wm, &mut term, &mut size).unwrap());
        assert!(refresh_screen(&mut wm, &mut term, &mut size).unwrap());
        assert_eq!(wm.screen_size(), (100, 30));
        wm.request_redraw();
        assert!(refresh_screen(&mut wm, &mut term, &mut size).unwrap());
        assert!(!wm.needs_redraw());
        assert_eq!(term.frames, 3);
    }

    #[test]
    fn size_errors_keep_last_size() {
        let mut wm = WindowManager::new(80, 24);
        wm.take_redraw();
        let mut term = CountingTerminal::default();
        let mut size = SizeScript {
            sizes: VecDeque::from([Err(io::Error::other("no tty"))]),
            last: (80, 24),
        };
        assert!(!refresh_screen(&mut wm, &mut term, &mut size).unwrap());
        assert_eq!(wm.screen_size(), (80, 24));
    }

    struct Scripted {
        events: VecDeque<InputEvent>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> Result<bool, InputError> {
            if self.events.is_empty() {
                Err(InputError::EndOfInput)
            } else {
                Ok(true)
            }
        }

        fn read(&mut self) -> Result<InputEvent, InputError> {
            self.events.pop_front().ok_or(InputError::EndOfInput)
        }
    }

    struct Recorder {
        wm: WindowManager,
        messages: Vec<WindowMessage>,
    }

    impl WindowApp for Recorder {
        fn windows(&mut self) -> &mut WindowManager {
            &mut self.wm
        }

        fn handle_message(&mut self, message: WindowMessage) -> ControlFlow {
            self.messages.push(message);
            match message.event {
                InputEvent::KeyPress(Key::Char('q')) => ControlFlow::Quit,
                _ => ControlFlow::Continue,
            }
        }
    }

    #[test]
    fn routes_events_and_quits() {
        let mut wm = WindowManager::new(80, 24);
        let a = wm.add_window(Window::new(Bounds::new(10, 10, 20, 10), true, vec![]));
        let b = wm.add_window(Window::new(Bounds::new(40, 10, 20, 10), true, vec![]));
        let mut app = Recorder {
            wm,
            messages: Vec::new(),
        };
        let driver = Scripted {
            events: VecDeque::from([
                InputEvent::Mouse(MouseEvent {
                    kind: MouseKind::LeftDown,
                    x: 12,
                    y: 12,
                }),
                InputEvent::KeyPress(Key::Up),
                InputEvent::KeyPress(Key::Char('q')),
                InputEvent::KeyPress(Key::Char('z')),
            ]),
        };
        let mut term = CountingTerminal::default();
        let mut size = SizeScript {
            sizes: VecDeque::new(),
            last: (80, 24),
        };
        run_window_app(&mut app, &mut term, &mut size, driver, Duration::from_millis(1)).unwrap();

        assert_eq!(app.messages.len(), 3);
        assert_eq!(app.messages[0].window, Some(a));
        assert_eq!(app.messages[1].window, Some(a));
        assert_eq!(app.wm.z_order().last(), Some(&a));
        assert_ne!(app.wm.focused(), Some(b));
        // Initial paint plus the repaint after the raise.
        assert_eq!(term.frames, 2);
    }

    #[test]
    fn end_of_input_ends_the_loop() {
        let mut app = Recorder {
            wm: WindowManager::new(10, 5),
            messages: Vec::new(),
        };
        let driver = Scripted {
            events: VecDeque::new(),
        };
        let mut term = CountingTerminal::default();
        let mut size = SizeScript {
            sizes: VecDeque::new(),
            last: (10, 5),
        };
        let err = run_window_app(&mut app, &mut term, &mut size, driver, Duration::from_millis(1))
            .unwrap_err();
        assert!(err.is_end_of_input());
        assert_eq!(term.frames, 1);
    }
}
