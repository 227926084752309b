//! Shared crate-wide constants.

use std::time::Duration;

/// Default interval between main-loop ticks.
///
/// Each tick polls the terminal size and dispatches at most one queued input
/// event, so this also bounds input latency. Input is human-paced; anything
/// in the 10-40ms range keeps drags feeling responsive.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bounds accepted for a user supplied poll interval, in milliseconds.
pub const POLL_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 1..=1000;

/// Capacity of the queue between the input task and the main loop.
///
/// A single slot makes the decoder block until the router has consumed the
/// previous event, so events are never dropped and never reordered.
pub const INPUT_QUEUE_CAPACITY: usize = 1;

/// Maximum number of numeric parameters retained for one CSI sequence.
/// Parameters beyond this are discarded.
pub const MAX_CSI_PARAMS: usize = 16;

/// Offset added by the terminal to X10 mouse button and coordinate bytes.
pub const X10_OFFSET: u8 = 32;

/// Name given to the input decoder thread.
pub const INPUT_THREAD_NAME: &str = "input-decoder";
