use std::io::{self, Cursor};
use std::time::Duration;

use term_compositor::drivers::SizeProvider;
use term_compositor::drivers::console::ConsoleTerminal;
use term_compositor::event_loop::ControlFlow;
use term_compositor::input::{ByteReader, ControlKey, InputEvent, Key, MouseKind, task};
use term_compositor::runner::{WindowApp, run_window_app};
use term_compositor::window::{Bounds, Window, WindowId, WindowManager, WindowMessage};

struct FixedSize(u16, u16);

impl SizeProvider for FixedSize {
    fn current_size(&mut self) -> io::Result<(u16, u16)> {
        Ok((self.0, self.1))
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
        if message.event == InputEvent::KeyPress(Key::Char('q')) {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        }
    }
}

fn two_windows() -> (Recorder, WindowId, WindowId) {
    let mut wm = WindowManager::new(80, 24);
    let w1 = wm.add_window(Window::new(
        Bounds::new(10, 10, 20, 10),
        true,
        vec!["hello".to_string()],
    ));
    let w2 = wm.add_window(Window::new(Bounds::new(15, 15, 20, 10), true, Vec::new()));
    let app = Recorder {
        wm,
        messages: Vec::new(),
    };
    (app, w1, w2)
}

fn x10_click(x: u8, y: u8) -> Vec<u8> {
    vec![0x1b, b'[', b'M', 0x20, x + 32, y + 32]
}

#[test]
fn bytes_flow_from_decoder_to_windows() {
    let (mut app, w1, w2) = two_windows();

    let mut input = Vec::new();
    input.extend_from_slice(b"a");
    input.extend(x10_click(12, 12));
    input.extend_from_slice(b"\x1b[A\t\x1b[5~");
    input.extend(x10_click(30, 22));
    input.extend_from_slice(b"q");
    input.extend_from_slice(b"never seen");

    let (task, driver) = task::spawn(ByteReader::new(Cursor::new(input))).unwrap();
    let mut terminal = ConsoleTerminal::new(Vec::new());
    run_window_app(
        &mut app,
        &mut terminal,
        &mut FixedSize(80, 24),
        driver,
        Duration::from_millis(5),
    )
    .unwrap();
    task.join().unwrap();

    let routed: Vec<(InputEvent, Option<WindowId>)> = app
        .messages
        .iter()
        .map(|m| (m.event, m.window))
        .collect();
    assert_eq!(routed.len(), 7);
    // Typed before any click: the most recently added window has focus.
    assert_eq!(routed[0], (InputEvent::KeyPress(Key::Char('a')), Some(w2)));
    assert!(matches!(routed[1].0, InputEvent::Mouse(m) if m.kind == MouseKind::LeftDown));
    assert_eq!(routed[1].1, Some(w1));
    assert_eq!(routed[2], (InputEvent::KeyPress(Key::Up), Some(w1)));
    assert_eq!(routed[3], (InputEvent::Control(ControlKey::Tab), Some(w1)));
    assert_eq!(routed[4], (InputEvent::KeyPress(Key::PageUp), Some(w1)));
    // (30, 22) is only inside W2, which was buried by the first click.
    assert_eq!(routed[5].1, Some(w2));
    assert_eq!(routed[6].0, InputEvent::KeyPress(Key::Char('q')));

    assert_eq!(app.wm.z_order().last(), Some(&w2));
    assert_eq!(app.wm.focused(), Some(w2));
    assert!(!terminal.writer().is_empty());
}

#[test]
fn end_of_input_reaches_the_loop_once_input_is_exhausted() {
    let (mut app, _, w2) = two_windows();
    let (task, driver) = task::spawn(ByteReader::new(Cursor::new(b"xy".to_vec()))).unwrap();
    let mut terminal = ConsoleTerminal::new(Vec::new());
    let err = run_window_app(
        &mut app,
        &mut terminal,
        &mut FixedSize(80, 24),
        driver,
        Duration::from_millis(5),
    )
    .unwrap_err();
    assert!(err.is_end_of_input());
    task.join().unwrap();

    assert_eq!(app.messages.len(), 2);
    assert!(app.messages.iter().all(|m| m.window == Some(w2)));
}

#[test]
fn incomplete_sequence_at_end_of_input_is_dropped() {
    let (mut app, _, _) = two_windows();
    let (task, driver) =
        task::spawn(ByteReader::new(Cursor::new(b"z\x1b[1".to_vec()))).unwrap();
    let mut terminal = ConsoleTerminal::new(Vec::new());
    let result = run_window_app(
        &mut app,
        &mut terminal,
        &mut FixedSize(80, 24),
        driver,
        Duration::from_millis(5),
    );
    assert!(result.is_err_and(|err| err.is_end_of_input()));
    task.join().unwrap();
    assert_eq!(app.messages.len(), 1);
    assert_eq!(app.messages[0].event, InputEvent::KeyPress(Key::Char('z')));
}
