//! Background thread that runs the decoder against a live byte source.
//!
//! The thread owns the [`EventDecoder`] and the source; it never touches
//! window-manager state. Decoded events travel to the main loop through a
//! bounded queue with [`INPUT_QUEUE_CAPACITY`] slots, so a slow consumer
//! stalls the decoder instead of losing input.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};

use super::{ByteSource, EventDecoder, InputError, InputEvent};
use crate::constants::{INPUT_QUEUE_CAPACITY, INPUT_THREAD_NAME};
use crate::drivers::channel::ChannelInputDriver;

pub type InputMessage = Result<InputEvent, InputError>;

pub struct InputTask {
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl InputTask {
    /// Asks the decoder thread to stop after the event it is currently
    /// waiting on. A thread blocked in a read stays blocked until a byte
    /// arrives or the process exits.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the decoder thread to end.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

/// Spawns the decoder thread and returns the driver the main loop reads from.
pub fn spawn<S>(source: S) -> io::Result<(InputTask, ChannelInputDriver)>
where
    S: ByteSource + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(INPUT_QUEUE_CAPACITY);
    let shutdown = Arc::new(AtomicBool::new(false));
    let thread_shutdown = Arc::clone(&shutdown);
    let handle = thread::Builder::new()
        .name(INPUT_THREAD_NAME.to_string())
        .spawn(move || decode_loop(source, tx, thread_shutdown))?;
    Ok((InputTask { shutdown, handle }, ChannelInputDriver::new(rx)))
}

fn decode_loop<S: ByteSource>(mut source: S, tx: SyncSender<InputMessage>, shutdown: Arc<AtomicBool>) {
    let mut decoder = EventDecoder::new();
    while !shutdown.load(Ordering::SeqCst) {
        match decoder.next_event(&mut source) {
            Ok(event) => {
                tracing::trace!(?event, "decoded input");
                if tx.send(Ok(event)).is_err() {
                    tracing::debug!("input receiver dropped, stopping decoder");
                    return;
                }
            }
            Err(err) => {
                match &err {
                    InputError::EndOfInput => tracing::info!("input stream closed"),
                    InputError::Io(io_err) => tracing::error!(error = %io_err, "input read failed"),
                }
                let _ = tx.send(Err(err));
                return;
            }
        }
    }
    tracing::debug!("input decoder shut down");
}
