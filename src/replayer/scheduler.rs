//! Host-side timer scheduling
//!
//! The chip reports timer starts and stops through [`TimerSink`]; the
//! scheduler turns them into deadlines measured in output samples. Time is
//! kept in units of `µs * sample_rate`, so one sample is exactly
//! 1 000 000 units and timer periods never round.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ym3812::{Timer, TimerSink};

const UNITS_PER_SAMPLE: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedTimer {
    period: u64,
    remaining: u64,
}

#[derive(Debug, Default)]
struct SchedulerState {
    armed: [Option<ArmedTimer>; 2],
    overflows: [u64; 2],
}

/// Timer sink recording armed timers in shared state
///
/// Clones share the same state: one clone is installed in the chip, the
/// player keeps another to query deadlines.
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    sample_rate: u64,
    state: Arc<Mutex<SchedulerState>>,
}

impl TimerScheduler {
    /// Scheduler for a chip running at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as u64,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// Whether a timer is armed
    pub fn is_armed(&self, timer: Timer) -> bool {
        self.state.lock().armed[timer as usize].is_some()
    }

    /// Overflows reported so far
    pub fn overflow_count(&self, timer: Timer) -> u64 {
        self.state.lock().overflows[timer as usize]
    }

    /// Samples to render before the next timer expires
    pub fn samples_until_next(&self) -> Option<u64> {
        let state = self.state.lock();
        state
            .armed
            .iter()
            .flatten()
            .map(|armed| armed.remaining.div_ceil(UNITS_PER_SAMPLE))
            .min()
    }

    /// Move time forward, returning each expiry in order of timer
    pub fn advance(&self, samples: u64) -> Vec<Timer> {
        let mut expired = Vec::new();
        let mut state = self.state.lock();
        let SchedulerState { armed, overflows } = &mut *state;
        for timer in Timer::ALL {
            let Some(slot) = armed[timer as usize].as_mut() else {
                continue;
            };
            let mut elapsed = samples * UNITS_PER_SAMPLE;
            while elapsed >= slot.remaining {
                elapsed -= slot.remaining;
                slot.remaining = slot.period;
                overflows[timer as usize] += 1;
                expired.push(timer);
            }
            slot.remaining -= elapsed;
        }
        expired
    }

    /// Disarm both timers and clear the counters
    pub fn clear(&self) {
        *self.state.lock() = SchedulerState::default();
    }
}

impl TimerSink for TimerScheduler {
    fn start(&mut self, timer: Timer, period: Duration) {
        let period = (period.as_micros() as u64 * self.sample_rate).max(1);
        self.state.lock().armed[timer as usize] = Some(ArmedTimer {
            period,
            remaining: period,
        });
    }

    fn stop(&mut self, timer: Timer) {
        self.state.lock().armed[timer as usize] = None;
    }
}
