//! Overlapping text windows in a raw terminal.
//!
//! Input bytes are decoded into key, control and X10 mouse events on a
//! dedicated thread ([`input`]). The main loop ([`runner`]) routes each event
//! to a window, raising windows on left clicks, and repaints the whole screen
//! through the [`window::compositor`] whenever something changed.

pub mod config;
pub mod constants;
pub mod drivers;
pub mod event_loop;
pub mod input;
pub mod runner;
pub mod signals;
pub mod tracing_sub;
pub mod window;
