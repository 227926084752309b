use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use super::InputDriver;
use crate::input::task::InputMessage;
use crate::input::{InputError, InputEvent};

/// Reads decoded events posted by the input task.
///
/// A disconnected queue is reported as [`InputError::EndOfInput`].
pub struct ChannelInputDriver {
    rx: Receiver<InputMessage>,
    pending: Option<InputEvent>,
}

impl ChannelInputDriver {
    pub fn new(rx: Receiver<InputMessage>) -> Self {
        Self { rx, pending: None }
    }
}

impl InputDriver for ChannelInputDriver {
    fn poll(&mut self, timeout: Duration) -> Result<bool, InputError> {
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                self.pending = Some(message?);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(InputError::EndOfInput),
        }
    }

    fn read(&mut self) -> Result<InputEvent, InputError> {
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }
        match self.rx.recv() {
            Ok(message) => message,
            Err(_) => Err(InputError::EndOfInput),
        }
    }
}
