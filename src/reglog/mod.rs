//! Register Log Formats
//!
//! Captured OPL register streams, as written by DOSBox (DRO) or shipped with
//! id Software games (IMF), parsed into a flat sequence of register writes
//! and delays:
//! - DRO v2.0 (DOSBox Raw OPL, millisecond ticks)
//! - IMF type 0 and type 1 (fixed tick rate, 700 Hz by default)

pub mod dro;
pub mod imf;
pub mod loader;

pub use dro::{DroHeader, DroParser};
pub use imf::ImfParser;
pub use loader::{detect_format, load_log, load_log_with, parse_log, LogFormat};

use crate::{Result, Ym3812Error};
use std::time::Duration;

/// One entry of a register log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    /// Register write through the address / data port pair
    Write {
        /// Register address
        register: u8,
        /// Data byte
        value: u8,
    },
    /// Wait before the next event
    Delay {
        /// Length in log ticks
        ticks: u32,
    },
}

/// Register writes and delays at a fixed tick rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLog {
    /// Ticks per second
    pub tick_rate: u32,
    /// Events in playback order
    pub events: Vec<LogEvent>,
}

impl RegisterLog {
    /// Empty log
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_rate,
            events: Vec::new(),
        }
    }

    /// Append a register write
    pub fn push_write(&mut self, register: u8, value: u8) {
        self.events.push(LogEvent::Write { register, value });
    }

    /// Append a delay; zero-length delays are dropped
    pub fn push_delay(&mut self, ticks: u32) {
        if ticks > 0 {
            self.events.push(LogEvent::Delay { ticks });
        }
    }

    /// Sum of all delays in ticks
    pub fn total_ticks(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                LogEvent::Delay { ticks } => *ticks as u64,
                LogEvent::Write { .. } => 0,
            })
            .sum()
    }

    /// Playing time
    pub fn duration(&self) -> Duration {
        if self.tick_rate == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_ticks() as u128 * 1_000_000_000 / self.tick_rate as u128;
        Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }

    /// Number of register writes
    pub fn write_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, LogEvent::Write { .. }))
            .count()
    }

    /// No events at all
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Trait for parsing register log formats
pub trait FormatParser {
    /// Parse file data into a register log
    fn parse(&self, data: &[u8]) -> Result<RegisterLog>;

    /// Get parser name
    fn name(&self) -> &str;
}

/// Turn a nom failure into a parse error naming the format
pub(crate) fn nom_error(format: &str, err: nom::Err<nom::error::Error<&[u8]>>) -> Ym3812Error {
    let reason = match err {
        nom::Err::Incomplete(_) => "unexpected end of data".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{:?} with {} bytes left", e.code, e.input.len())
        }
    };
    Ym3812Error::ParseError(format!("{format}: {reason}"))
}
