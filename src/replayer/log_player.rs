//! Register Log Player
//!
//! Drives a chip from a [`RegisterLog`]: writes are sent through the bus
//! port pair, delays become sample counts, and armed timers are reported
//! back to the chip at their exact sample deadlines.

use log::{debug, info};

use super::sample_clock::SampleClock;
use super::scheduler::TimerScheduler;
use crate::reglog::{LogEvent, RegisterLog};
use crate::ym3812::Ym3812;

/// Plays a register log on a chip
pub struct LogPlayer {
    chip: Ym3812,
    log: RegisterLog,
    /// Index of the next event
    position: usize,
    /// Samples still owed to the current delay
    pending: u64,
    /// Samples rendered so far
    rendered: u64,
    clock: SampleClock,
    scheduler: TimerScheduler,
}

impl LogPlayer {
    /// Take ownership of a chip and a log; the chip's timer sink is replaced
    pub fn new(mut chip: Ym3812, log: RegisterLog) -> Self {
        let sample_rate = chip.config().sample_rate;
        let scheduler = TimerScheduler::new(sample_rate);
        chip.set_timer_sink(Box::new(scheduler.clone()));
        info!(
            "Log player: {} events at {} Hz, {:.2}s",
            log.events.len(),
            log.tick_rate,
            log.duration().as_secs_f64()
        );
        Self {
            clock: SampleClock::new(log.tick_rate, sample_rate),
            chip,
            log,
            position: 0,
            pending: 0,
            rendered: 0,
            scheduler,
        }
    }

    /// Render `count` samples, continuing with free-running chip output once the log ends
    pub fn render(&mut self, count: usize) -> Vec<i16> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            if self.pending == 0 && !self.run_events() {
                let rest = (count - out.len()) as u64;
                self.render_samples(rest, &mut out);
                break;
            }
            let step = self.pending.min((count - out.len()) as u64);
            self.render_samples(step, &mut out);
            self.pending -= step;
        }
        out
    }

    /// Render until the last event has been played
    pub fn render_to_end(&mut self) -> Vec<i16> {
        let mut out = Vec::with_capacity(self.remaining_samples() as usize);
        loop {
            if self.pending == 0 && !self.run_events() {
                break;
            }
            let step = self.pending;
            self.render_samples(step, &mut out);
            self.pending = 0;
        }
        debug!("Rendered log to end: {} samples", out.len());
        out
    }

    /// Apply events up to the next non-empty delay; false once the log is exhausted
    fn run_events(&mut self) -> bool {
        while let Some(&event) = self.log.events.get(self.position) {
            self.position += 1;
            match event {
                LogEvent::Write { register, value } => {
                    self.chip.write(0, register);
                    self.chip.write(1, value);
                }
                LogEvent::Delay { ticks } => {
                    self.pending += self.clock.samples_for(ticks);
                    if self.pending > 0 {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Render in slices that end at timer deadlines
    fn render_samples(&mut self, mut count: u64, out: &mut Vec<i16>) {
        while count > 0 {
            let step = self
                .scheduler
                .samples_until_next()
                .map_or(count, |next| next.clamp(1, count));
            out.extend(self.chip.generate(step as usize));
            count -= step;
            self.rendered += step;
            for timer in self.scheduler.advance(step) {
                self.chip.timer_over(timer);
            }
        }
    }

    /// Every event has been applied and no delay is pending
    pub fn is_finished(&self) -> bool {
        self.position >= self.log.events.len() && self.pending == 0
    }

    /// Index of the next event to apply
    pub fn position(&self) -> usize {
        self.position
    }

    /// Samples rendered so far
    pub fn samples_rendered(&self) -> u64 {
        self.rendered
    }

    /// Samples left until the end of the log
    pub fn remaining_samples(&self) -> u64 {
        let ticks = self.log.events[self.position.min(self.log.events.len())..]
            .iter()
            .filter_map(|e| match e {
                LogEvent::Delay { ticks } => Some(*ticks as u64),
                LogEvent::Write { .. } => None,
            })
            .sum::<u64>();
        self.pending + self.clock.peek(ticks)
    }

    /// Reset the chip and play from the first event
    pub fn restart(&mut self) {
        self.chip.reset();
        self.scheduler.clear();
        self.clock.reset();
        self.position = 0;
        self.pending = 0;
        self.rendered = 0;
    }

    /// The register log being played
    pub fn log(&self) -> &RegisterLog {
        &self.log
    }

    /// Timer scheduler shared with the chip
    pub fn scheduler(&self) -> &TimerScheduler {
        &self.scheduler
    }

    /// Chip being driven
    pub fn chip(&self) -> &Ym3812 {
        &self.chip
    }

    /// Mutable chip access
    pub fn chip_mut(&mut self) -> &mut Ym3812 {
        &mut self.chip
    }

    /// Give back the chip
    pub fn into_chip(self) -> Ym3812 {
        self.chip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ym3812::Timer;

    fn chip() -> Ym3812 {
        Ym3812::with_clocks(3_579_545, 44_100).unwrap()
    }

    fn note_log() -> RegisterLog {
        let mut log = RegisterLog::new(1000);
        for (reg, value) in [(0x20, 0x01), (0x23, 0x01), (0x63, 0xf4), (0x83, 0x0f), (0xa0, 0x41), (0xb0, 0x32)] {
            log.push_write(reg, value);
        }
        log.push_delay(100);
        log.push_write(0xb0, 0x12);
        log.push_delay(50);
        log
    }

    #[test]
    fn test_render_to_end_length() {
        let mut player = LogPlayer::new(chip(), note_log());
        assert_eq!(player.remaining_samples(), 4410 + 2205);
        let samples = player.render_to_end();
        assert_eq!(samples.len(), 4410 + 2205);
        assert!(player.is_finished());
        assert!(samples[..4410].iter().any(|&s| s != 0));
    }

    #[test]
    fn test_render_in_chunks_matches_render_to_end() {
        let mut whole = LogPlayer::new(chip(), note_log());
        let mut chunked = LogPlayer::new(chip(), note_log());
        let expected = whole.render_to_end();
        let mut got = Vec::new();
        while got.len() < expected.len() {
            got.extend(chunked.render(1000.min(expected.len() - got.len())));
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn test_render_pads_after_end() {
        let mut player = LogPlayer::new(chip(), note_log());
        let samples = player.render(10_000);
        assert_eq!(samples.len(), 10_000);
        assert!(player.is_finished());
        assert_eq!(player.samples_rendered(), 10_000);
    }

    #[test]
    fn test_timers_fire_through_scheduler() {
        let mut log = RegisterLog::new(1000);
        log.push_write(0x02, 0xff);
        log.push_write(0x04, 0x01);
        log.push_delay(1000);
        let mut player = LogPlayer::new(chip(), log);
        player.render_to_end();
        assert_eq!(player.scheduler().overflow_count(Timer::A), 12_500);
        assert!(player.chip().status().irq());
    }

    #[test]
    fn test_restart_replays_identically() {
        let mut player = LogPlayer::new(chip(), note_log());
        let first = player.render_to_end();
        player.restart();
        assert_eq!(player.position(), 0);
        assert_eq!(player.render_to_end(), first);
    }
}
