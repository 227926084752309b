use std::time::Duration;

use crate::drivers::InputDriver;
use crate::input::{InputError, InputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// A tick-driven loop that owns the main thread.
///
/// Every iteration first calls the handler with `None` (a tick, used for
/// size polling and redraws), then waits up to `poll_interval` for input and
/// dispatches at most one event with `Some(event)`. Limiting dispatch to one
/// event per tick keeps redraw checks running while input is arriving; the
/// bounded input queue holds the rest back without dropping anything.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> Result<Option<InputEvent>, InputError> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Runs until the handler returns [`ControlFlow::Quit`] or the driver fails.
    pub fn run<F, E>(&mut self, mut handler: F) -> Result<(), E>
    where
        F: FnMut(Option<InputEvent>) -> Result<ControlFlow, E>,
        E: From<InputError>,
    {
        loop {
            if let ControlFlow::Quit = handler(None)? {
                return Ok(());
            }
            if let Some(event) = self.poll()?
                && let ControlFlow::Quit = handler(Some(event))?
            {
                return Ok(());
            }
        }
    }
}
