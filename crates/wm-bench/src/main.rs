use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::buffer::Buffer;

use term_compositor::drivers::TerminalControl;
use term_compositor::drivers::console::ConsoleTerminal;
use term_compositor::input::{InputEvent, MouseEvent, MouseKind};
use term_compositor::window::compositor::{compose, paint};
use term_compositor::window::{Bounds, Window, WindowId, WindowManager};

const FILLER: [&str; 6] = ["lorem ipsum", "dolor sit", "amet", "consectetur", "adipiscing", "elit"];

#[derive(Parser, Debug)]
#[command(
    name = "wm-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compositor benchmark: overlapping windows drifting and restacking every frame"
)]
struct BenchCli {
    /// How long to run the benchmark.
    #[arg(
        short = 'd',
        long = "duration",
        value_name = "SECONDS",
        default_value_t = 10.0
    )]
    duration_seconds: f64,

    /// Target frames per second. Used to pace rendering so comparisons are repeatable.
    #[arg(short = 'f', long = "fps", value_name = "FPS", default_value_t = 60.0)]
    target_fps: f64,

    /// Number of top-level windows in the stack.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 12)]
    windows: usize,
}

impl BenchCli {
    fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }
}

struct BenchConfig {
    duration: Duration,
    target_fps: f64,
    frame_budget: Duration,
    windows: usize,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(0.5..=600.0).contains(&cli.duration_seconds) {
            return Err("duration must be between 0.5 and 600 seconds".to_string());
        }
        if !(1.0..=240.0).contains(&cli.target_fps) {
            return Err("fps must be between 1 and 240".to_string());
        }
        if !(1..=256).contains(&cli.windows) {
            return Err("windows must be between 1 and 256".to_string());
        }
        Ok(Self {
            duration: cli.duration(),
            target_fps: cli.target_fps,
            frame_budget: cli.frame_budget(),
            windows: cli.windows,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let mut terminal = ConsoleTerminal::stdout();
    terminal.enter(false)?;

    let bench_result = run_benchmark(&mut terminal, &config);

    terminal.exit()?;

    let stats = bench_result?;
    println!("{}", stats.final_report(&config));

    Ok(())
}

fn run_benchmark(terminal: &mut ConsoleTerminal, config: &BenchConfig) -> io::Result<BenchStats> {
    let (width, height) = crossterm::terminal::size()?;
    let mut scene = DriftScene::new(width, height, config.windows);
    let mut stats = BenchStats::new();

    loop {
        let frame_start = Instant::now();
        if let Ok((width, height)) = crossterm::terminal::size() {
            scene.wm.set_screen_size(width, height);
        }
        scene.step();
        let buffer = compose(&scene.wm);
        let composed = frame_start.elapsed();
        paint(&buffer, terminal)?;
        let frame_time = frame_start.elapsed();
        stats.record_frame(cell_count(&buffer), composed, frame_time - composed);

        if stats.start.elapsed() >= config.duration {
            break;
        }
        if poll_for_exit(config.frame_budget.saturating_sub(frame_time))? {
            stats.aborted = true;
            break;
        }
    }

    stats.raises = scene.raises;
    stats.finish();
    Ok(stats)
}

fn cell_count(buffer: &Buffer) -> u64 {
    u64::from(buffer.area.width) * u64::from(buffer.area.height)
}

/// A stack of bordered windows bouncing around the screen. Every few frames
/// a synthetic left click lands on a random window, going through the same
/// hit-test and raise path as real input.
struct DriftScene {
    wm: WindowManager,
    windows: Vec<Drifter>,
    rng: Lcg,
    tick: u64,
    raises: u64,
}

struct Drifter {
    id: WindowId,
    bounds: Bounds,
    dx: i32,
    dy: i32,
}

impl DriftScene {
    fn new(width: u16, height: u16, count: usize) -> Self {
        let mut wm = WindowManager::new(width, height);
        let mut rng = Lcg::seeded_from_clock();
        let mut windows = Vec::with_capacity(count);
        for n in 0..count {
            let w = 12 + (rng.next() % 20) as u16;
            let h = 4 + (rng.next() % 8) as u16;
            let x = 1 + (rng.next() % u32::from(width.max(1))) as i32;
            let y = 1 + (rng.next() % u32::from(height.max(1))) as i32;
            let bounds = Bounds::new(x, y, w, h);
            let content = vec![
                format!("window {n}"),
                FILLER[n % FILLER.len()].to_string(),
            ];
            let id = wm.add_window(Window::new(bounds, true, content));
            windows.push(Drifter {
                id,
                bounds,
                dx: if rng.next() & 1 == 0 { 1 } else { -1 },
                dy: if rng.next() & 1 == 0 { 1 } else { -1 },
            });
        }
        Self {
            wm,
            windows,
            rng,
            tick: 0,
            raises: 0,
        }
    }

    fn step(&mut self) {
        let (width, height) = self.wm.screen_size();
        let (max_x, max_y) = (i32::from(width), i32::from(height));
        for drifter in &mut self.windows {
            let b = &mut drifter.bounds;
            if b.x + drifter.dx < 1 - i32::from(b.width) / 2 || b.x + drifter.dx > max_x {
                drifter.dx = -drifter.dx;
            }
            if b.y + drifter.dy < 1 - i32::from(b.height) / 2 || b.y + drifter.dy > max_y {
                drifter.dy = -drifter.dy;
            }
            b.x += drifter.dx;
            b.y += drifter.dy;
            let _ = self.wm.set_bounds(drifter.id, *b);
        }

        if self.tick % 8 == 0 && !self.windows.is_empty() {
            let pick = (self.rng.next() as usize) % self.windows.len();
            let b = self.windows[pick].bounds;
            let x = (b.x + i32::from(b.width) / 2).clamp(1, max_x.max(1));
            let y = (b.y + i32::from(b.height) / 2).clamp(1, max_y.max(1));
            let before = self.wm.z_order().last().copied();
            self.wm.route(InputEvent::Mouse(MouseEvent {
                kind: MouseKind::LeftDown,
                x: x as u16,
                y: y as u16,
            }));
            if self.wm.z_order().last().copied() != before {
                self.raises += 1;
            }
        }
        self.tick = self.tick.wrapping_add(1);
    }
}

/// Compose and paint are timed separately: compose is pure compositor work,
/// paint is dominated by the terminal.
struct BenchStats {
    start: Instant,
    elapsed: Option<Duration>,
    frames: u64,
    cells: u64,
    raises: u64,
    compose_time: Duration,
    paint_time: Duration,
    worst_frame: Duration,
    aborted: bool,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: None,
            frames: 0,
            cells: 0,
            raises: 0,
            compose_time: Duration::ZERO,
            paint_time: Duration::ZERO,
            worst_frame: Duration::ZERO,
            aborted: false,
        }
    }

    fn finish(&mut self) {
        self.elapsed = Some(self.start.elapsed());
    }

    fn record_frame(&mut self, cells: u64, compose: Duration, paint: Duration) {
        self.frames += 1;
        self.cells = self.cells.saturating_add(cells);
        self.compose_time += compose;
        self.paint_time += paint;
        self.worst_frame = self.worst_frame.max(compose + paint);
    }

    fn per_frame_ms(&self, total: Duration) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        total.as_secs_f64() * 1_000.0 / self.frames as f64
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self
            .elapsed
            .unwrap_or_else(|| self.start.elapsed())
            .as_secs_f64();
        let rate = |n: u64| if elapsed > 0.0 { n as f64 / elapsed } else { 0.0 };

        indoc::formatdoc!(
            r#"
            Compositor bench {status}.
            {windows} windows, {raises} raised by synthetic clicks, {elapsed:.2}s
            Frames: {frames} ({fps:.1} fps, target {target_fps:.1})
            Per frame: compose {compose:.3} ms | paint {paint:.3} ms | worst {worst:.2} ms
            Cells: {cells} (~{cells_per_sec:.0}/s)
            "#,
            status = if self.aborted { "stopped by user" } else { "finished" },
            windows = config.windows,
            raises = self.raises,
            frames = self.frames,
            fps = rate(self.frames),
            target_fps = config.target_fps,
            compose = self.per_frame_ms(self.compose_time),
            paint = self.per_frame_ms(self.paint_time),
            worst = self.worst_frame.as_secs_f64() * 1_000.0,
            cells = self.cells,
            cells_per_sec = rate(self.cells),
        )
    }
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
}

/// Drains pending terminal events; true when one of them asks to stop.
fn poll_for_exit(wait: Duration) -> io::Result<bool> {
    let mut wait = wait;
    while event::poll(wait)? {
        wait = Duration::ZERO;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let ctrl_c =
            key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if key.kind == KeyEventKind::Press
            && (ctrl_c || matches!(key.code, KeyCode::Char('q' | 'Q') | KeyCode::Esc))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
