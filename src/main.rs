use std::io;
use std::sync::Arc;

use clap::Parser;

use term_compositor::config::{Cli, Config};
use term_compositor::drivers::TerminalControl;
use term_compositor::drivers::console::{ConsoleSize, ConsoleTerminal};
use term_compositor::event_loop::ControlFlow;
use term_compositor::input::{ByteReader, InputEvent, Key, MouseKind, task};
use term_compositor::runner::{WindowApp, run_window_app};
use term_compositor::signals::{SignalGuard, install_panic_hook};
use term_compositor::tracing_sub;
use term_compositor::window::decorator::AsciiDecorator;
use term_compositor::window::{Bounds, Window, WindowId, WindowManager, WindowMessage};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn main() -> io::Result<()> {
    let args = Cli::parse();
    let config = Config::try_from(&args)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    tracing_sub::init_default(config.log_file.as_deref())?;
    install_panic_hook();
    let _signals = SignalGuard::install()?;

    let (width, height) = crossterm::terminal::size().unwrap_or(FALLBACK_SIZE);
    let mut app = DemoApp::new(width, height);
    if config.ascii_borders {
        app.windows.set_decorator(Arc::new(AsciiDecorator));
    }

    let mut terminal = ConsoleTerminal::stdout();
    terminal.enter(config.mouse_reporting)?;
    let (input, driver) = task::spawn(ByteReader::new(io::stdin()))?;

    let result = run_window_app(
        &mut app,
        &mut terminal,
        &mut ConsoleSize,
        driver,
        config.poll_interval,
    );

    input.shutdown();
    terminal.exit()?;

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_end_of_input() => {
            tracing::info!("input closed, shutting down");
            Ok(())
        }
        Err(err) => Err(io::Error::other(err)),
    }
}

struct DemoApp {
    windows: WindowManager,
    status: WindowId,
}

impl DemoApp {
    fn new(width: u16, height: u16) -> Self {
        let mut windows = WindowManager::new(width, height);
        let _ = windows.set_content(
            windows.background(),
            vec!["q quits, click a window to raise it".to_string()],
        );

        windows.add_window(Window::new(
            Bounds::new(10, 10, 20, 10),
            true,
            vec!["hello".to_string()],
        ));
        windows.add_window(Window::new(
            Bounds::new(15, 15, 20, 10),
            true,
            vec!["world".to_string()],
        ));
        let parent = windows.add_window(Window::new(
            Bounds::new(40, 3, 30, 10),
            true,
            vec!["parent".to_string()],
        ));
        let _ = windows.add_child(
            parent,
            Window::new(
                Bounds::new(44, 6, 16, 4),
                true,
                vec!["child".to_string()],
            ),
        );
        let status = windows.add_window(Window::new(
            Bounds::new(40, 15, 30, 3),
            true,
            vec!["press a key".to_string()],
        ));

        Self { windows, status }
    }

    fn describe(event: &InputEvent) -> String {
        match event {
            InputEvent::KeyPress(key) => format!("last key: {key}"),
            InputEvent::Control(ctrl) => format!("last control: {ctrl}"),
            InputEvent::ClearScreen => "clear screen".to_string(),
            InputEvent::ClearLine => "clear line".to_string(),
            InputEvent::Mouse(mouse) => format!("{:?} at {},{}", mouse.kind, mouse.x, mouse.y),
        }
    }
}

impl WindowApp for DemoApp {
    fn windows(&mut self) -> &mut WindowManager {
        &mut self.windows
    }

    fn handle_message(&mut self, message: WindowMessage) -> ControlFlow {
        if matches!(
            message.event,
            InputEvent::KeyPress(Key::Char('q' | '\u{3}'))
        ) {
            return ControlFlow::Quit;
        }

        let text = Self::describe(&message.event);
        let _ = self.windows.set_content(self.status, vec![text.clone()]);

        let target = match message.event {
            InputEvent::Mouse(mouse) if mouse.kind != MouseKind::LeftDown => None,
            _ => message.window,
        };
        if let Some(id) = target
            && id != self.windows.background()
            && id != self.status
        {
            let _ = self.windows.set_content(id, vec![text]);
        }
        ControlFlow::Continue
    }
}
