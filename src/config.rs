use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::constants::{DEFAULT_POLL_INTERVAL, POLL_INTERVAL_RANGE_MS};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "term-compositor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Overlapping text windows with mouse raise-to-top in a raw terminal"
)]
pub struct Cli {
    /// How long the main loop waits for input before checking for resizes.
    #[arg(long = "poll-ms", value_name = "MILLIS", default_value_t = 10)]
    pub poll_ms: u64,

    /// Do not ask the terminal for X10 mouse reports.
    #[arg(long = "no-mouse")]
    pub no_mouse: bool,

    /// Draw window frames with `+`, `-` and `|`.
    #[arg(long = "ascii-borders")]
    pub ascii_borders: bool,

    /// Append debug logs to this file. Without it logs are discarded.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be between 1 and 1000 ms, got {0}")]
    PollInterval(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub poll_interval: Duration,
    pub mouse_reporting: bool,
    pub ascii_borders: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            mouse_reporting: true,
            ascii_borders: false,
            log_file: None,
        }
    }
}

impl TryFrom<&Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !POLL_INTERVAL_RANGE_MS.contains(&cli.poll_ms) {
            return Err(ConfigError::PollInterval(cli.poll_ms));
        }
        Ok(Self {
            poll_interval: Duration::from_millis(cli.poll_ms),
            mouse_reporting: !cli.no_mouse,
            ascii_borders: cli.ascii_borders,
            log_file: cli.log_file.clone(),
        })
    }
}
