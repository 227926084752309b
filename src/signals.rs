//! Terminal restoration on abnormal exit.
//!
//! The normal path restores the terminal through `Drop` on
//! [`ConsoleTerminal`](crate::drivers::console::ConsoleTerminal). Signals and
//! panics skip that, so both get a best-effort restore here.

use std::io;
use std::sync::OnceLock;

use crate::drivers::console::best_effort_restore;

/// Restores the terminal before any previously installed panic hook runs.
/// Installing more than once is a no-op.
pub fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_restore();
            previous(info);
        }));
    });
}

/// Watches for SIGINT and SIGTERM while alive. On either signal the terminal
/// is restored and the process exits with `128 + signal`.
#[cfg(unix)]
#[derive(Debug)]
pub struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    pub fn install() -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("signal-guard".into())
            .spawn(move || {
                for signal in signals.forever() {
                    if matches!(signal, SIGINT | SIGTERM) {
                        tracing::warn!(signal, "termination signal received, restoring terminal");
                        best_effort_restore();
                        std::process::exit(128 + signal);
                    }
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(not(unix))]
#[derive(Debug)]
pub struct SignalGuard;

#[cfg(not(unix))]
impl SignalGuard {
    pub fn install() -> io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_shuts_down_cleanly() {
        let guard = SignalGuard::install().unwrap();
        drop(guard);
        let again = SignalGuard::install().unwrap();
        drop(again);
    }
}
