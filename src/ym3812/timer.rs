//! Timers A and B
//!
//! The chip only latches the timer registers and raises status flags on
//! overflow; counting time is left to the host. Starting and stopping a
//! timer is reported to a [`TimerSink`], and the host calls
//! [`Ym3812::timer_over`](super::Ym3812::timer_over) each time a period
//! elapses.

use std::time::Duration;

use num_derive::FromPrimitive;

/// One of the two hardware timers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Timer {
    /// 80 µs resolution (register 0x02)
    A = 0,
    /// 320 µs resolution (register 0x03)
    B = 1,
}

impl Timer {
    /// Both timers
    pub const ALL: [Timer; 2] = [Timer::A, Timer::B];

    /// Length of one count in microseconds
    pub fn resolution_us(self) -> u32 {
        match self {
            Timer::A => 80,
            Timer::B => 320,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Host collaborator notified when timers are armed or stopped
///
/// Timers are periodic: after `start` the host reports an overflow every
/// `period` until `stop` is called. A second `start` without a `stop`
/// re-arms the timer with the new period.
pub trait TimerSink {
    /// Timer armed with the given period
    fn start(&mut self, timer: Timer, period: Duration);

    /// Timer stopped
    fn stop(&mut self, timer: Timer);
}

/// Sink that drops every notification
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTimerSink;

impl TimerSink for NullTimerSink {
    fn start(&mut self, _timer: Timer, _period: Duration) {}

    fn stop(&mut self, _timer: Timer) {}
}

/// Timer latches and run state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    latch: [u8; 2],
    running: [bool; 2],
}

impl Timers {
    /// Cleared latches, both timers stopped
    pub fn new() -> Self {
        Self::default()
    }

    /// Latched start value
    pub fn latch(&self, timer: Timer) -> u8 {
        self.latch[timer.index()]
    }

    /// Whether the timer is armed
    pub fn is_running(&self, timer: Timer) -> bool {
        self.running[timer.index()]
    }

    /// Overflow period for the latched value: `(256 - latch) * resolution`
    pub fn period(&self, timer: Timer) -> Duration {
        let counts = 256 - self.latch[timer.index()] as u64;
        Duration::from_micros(counts * timer.resolution_us() as u64)
    }

    /// Latch a new start value, re-arming a running timer
    pub fn set_latch(&mut self, timer: Timer, value: u8, sink: &mut dyn TimerSink) {
        self.latch[timer.index()] = value;
        if self.is_running(timer) {
            sink.start(timer, self.period(timer));
        }
    }

    /// Start or stop a timer, notifying the sink on every change
    pub fn set_running(&mut self, timer: Timer, run: bool, sink: &mut dyn TimerSink) {
        let was_running = self.running[timer.index()];
        self.running[timer.index()] = run;
        if run {
            sink.start(timer, self.period(timer));
        } else if was_running {
            sink.stop(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(Timer, Option<Duration>)>,
    }

    impl TimerSink for Recorder {
        fn start(&mut self, timer: Timer, period: Duration) {
            self.events.push((timer, Some(period)));
        }

        fn stop(&mut self, timer: Timer) {
            self.events.push((timer, None));
        }
    }

    #[test]
    fn test_timer_from_primitive() {
        assert_eq!(Timer::from_u8(0), Some(Timer::A));
        assert_eq!(Timer::from_u8(1), Some(Timer::B));
        assert_eq!(Timer::from_u8(2), None);
    }

    #[test]
    fn test_periods() {
        let mut timers = Timers::new();
        let mut sink = NullTimerSink;
        assert_eq!(timers.period(Timer::A), Duration::from_micros(256 * 80));
        timers.set_latch(Timer::B, 0xff, &mut sink);
        assert_eq!(timers.period(Timer::B), Duration::from_micros(320));
    }

    #[test]
    fn test_sink_notifications() {
        let mut timers = Timers::new();
        let mut sink = Recorder::default();
        timers.set_latch(Timer::A, 0xfe, &mut sink);
        assert!(sink.events.is_empty());
        timers.set_running(Timer::A, true, &mut sink);
        timers.set_latch(Timer::A, 0xf0, &mut sink);
        timers.set_running(Timer::A, false, &mut sink);
        timers.set_running(Timer::A, false, &mut sink);
        assert_eq!(
            sink.events,
            vec![
                (Timer::A, Some(Duration::from_micros(160))),
                (Timer::A, Some(Duration::from_micros(16 * 80))),
                (Timer::A, None),
            ]
        );
    }
}
