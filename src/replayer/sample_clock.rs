//! Tick to sample conversion
//!
//! Converts log ticks to output samples with an integer remainder, so
//! rounding never accumulates across delays.

/// Exact tick-rate to sample-rate converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    tick_rate: u64,
    sample_rate: u64,
    /// Leftover `ticks * sample_rate` not yet converted
    remainder: u64,
}

impl SampleClock {
    /// Create a converter; a zero tick rate turns every delay into silence of length zero
    pub fn new(tick_rate: u32, sample_rate: u32) -> Self {
        SampleClock {
            tick_rate: tick_rate as u64,
            sample_rate: sample_rate as u64,
            remainder: 0,
        }
    }

    /// Samples covering the next `ticks`
    pub fn samples_for(&mut self, ticks: u32) -> u64 {
        if self.tick_rate == 0 {
            return 0;
        }
        let total = ticks as u64 * self.sample_rate + self.remainder;
        self.remainder = total % self.tick_rate;
        total / self.tick_rate
    }

    /// Samples for `ticks` without touching the remainder
    pub fn peek(&self, ticks: u64) -> u64 {
        if self.tick_rate == 0 {
            return 0;
        }
        (ticks * self.sample_rate + self.remainder) / self.tick_rate
    }

    /// Drop the carried remainder
    pub fn reset(&mut self) {
        self.remainder = 0;
    }
}
