//! YM3812 chip state, register bus and sample loop
//!
//! Every chip instance owns its full state, including the per-sample
//! modulation bus and channel taps; only the read-only operator tables are
//! shared between instances.

use std::fmt;

use log::{debug, trace};

use super::channel::Channel;
use super::config::{ChipConfig, ClockRates};
use super::constants::MAX_ATT_INDEX;
use super::envelope::{EnvelopeClock, EnvelopeState};
use super::generators::{Lfo, NoiseGenerator};
use super::operator::KeySource;
use super::registers::{Register, NUM_CHANNELS};
use super::rhythm::{self, RhythmVoice};
use super::status::{StatusFlags, StatusRegister};
use super::tables::{tables, Waveform};
use super::timer::{NullTimerSink, Timer, TimerSink, Timers};
use crate::Result;

/// Mode register: CSM auto key-on
const MODE_CSM: u8 = 0x80;
/// Mode register: note select (key code bit source)
const MODE_NOTE_SEL: u8 = 0x40;
/// Rhythm register: rhythm mode enable
const RHYTHM_ENABLE: u8 = 0x20;

/// Channels that stay melodic in rhythm mode
const MELODIC_IN_RHYTHM: usize = 6;

/// YM3812 (OPL2) FM synthesizer
///
/// A two-pin register bus (address / data port) controls nine
/// two-operator channels; channels 6-8 can switch to five rhythm voices.
/// Time only advances when samples are pulled.
///
/// # Example
///
/// ```
/// use ym3812::Ym3812;
///
/// let mut chip = Ym3812::with_clocks(3_579_545, 44_100).unwrap();
///
/// // channel 0: carrier loud, fast attack, A-440 with key on
/// chip.write_register(0x20, 0x01);
/// chip.write_register(0x23, 0x01);
/// chip.write_register(0x43, 0x00);
/// chip.write_register(0x63, 0xf4);
/// chip.write_register(0xa0, 0x41);
/// chip.write_register(0xb0, 0x32);
///
/// let samples: Vec<i16> = chip.generate(512).collect();
/// assert!(samples.iter().any(|&s| s != 0));
/// ```
pub struct Ym3812 {
    config: ChipConfig,
    rates: ClockRates,

    // Synthesis state
    channels: [Channel; NUM_CHANNELS],
    lfo: Lfo,
    noise: NoiseGenerator,
    eg_clock: EnvelopeClock,

    // Bus and control registers
    address: u8,
    wave_select: bool,
    mode: u8,
    rhythm: u8,
    status: StatusRegister,
    timers: Timers,
    sink: Box<dyn TimerSink + Send>,

    // Per-channel taps of the last sample
    channel_outputs: [i32; NUM_CHANNELS],
}

impl Ym3812 {
    /// Create and reset a chip
    ///
    /// Fails with [`crate::Ym3812Error::ConfigError`] when the clocks are zero or
    /// their ratio overflows the fixed-point accumulators.
    pub fn new(config: ChipConfig) -> Result<Self> {
        let rates = ClockRates::new(&config)?;
        // build the shared tables up front rather than on the first sample
        let _ = tables();

        let mut chip = Self {
            lfo: Lfo::new(rates.lfo_am_inc, rates.lfo_pm_inc),
            noise: NoiseGenerator::new(rates.noise_f),
            eg_clock: EnvelopeClock::new(rates.eg_timer_add),
            config,
            rates,
            channels: Default::default(),
            address: 0,
            wave_select: false,
            mode: 0,
            rhythm: 0,
            status: StatusRegister::new(),
            timers: Timers::new(),
            sink: Box::new(NullTimerSink),
            channel_outputs: [0; NUM_CHANNELS],
        };
        chip.reset();
        Ok(chip)
    }

    /// Create with default settings and custom clocks
    ///
    /// # Arguments
    ///
    /// * `clock_hz` - Chip input clock in Hz (3.579545 MHz on most boards)
    /// * `sample_rate` - Output sample rate in Hz
    pub fn with_clocks(clock_hz: u32, sample_rate: u32) -> Result<Self> {
        Self::new(ChipConfig::with_clocks(clock_hz, sample_rate))
    }

    /// Reset: silence every operator and replay a full register clear
    ///
    /// Channels come out of reset with serial routing, the connection a
    /// cleared 0xC0 register selects. Some emulators leave channels parallel
    /// until the first 0xC0 write; with every operator silenced the two only
    /// differ for a patch that never writes 0xC0.
    pub fn reset(&mut self) {
        self.eg_clock.reset();
        self.noise.reset();
        self.mode = 0;
        self.status.reset(0x7f);

        self.write_register(0x01, 0);
        self.write_register(0x02, 0);
        self.write_register(0x03, 0);
        self.write_register(0x04, 0);
        for reg in (0x20..=0xffu8).rev() {
            self.write_register(reg, 0);
        }

        for ch in self.channels.iter_mut() {
            for op in ch.operators_mut() {
                op.silence();
            }
        }
        self.channel_outputs = [0; NUM_CHANNELS];
        debug!("YM3812 reset");
    }

    /// Install the collaborator notified when timers start and stop
    pub fn set_timer_sink(&mut self, sink: Box<dyn TimerSink + Send>) {
        self.sink = sink;
    }

    /// Bus write: even port latches the address, odd port writes data
    ///
    /// Returns the IRQ bit of the status register.
    pub fn write(&mut self, port: u8, value: u8) -> u8 {
        if port & 1 == 0 {
            self.address = value;
        } else {
            self.write_register(self.address, value);
        }
        self.status.bits() >> 7
    }

    /// Bus read: even port returns the masked status, odd port reads 0xFF
    pub fn read(&self, port: u8) -> u8 {
        if port & 1 == 0 {
            self.status.read()
        } else {
            0xff
        }
    }

    /// Write a register directly (address latch bypassed)
    pub fn write_register(&mut self, reg: u8, value: u8) {
        let decoded = Register::from_addr(reg);
        trace!("OPL {reg:02X} <- {value:02X} [{decoded}]");

        match decoded {
            Register::WaveSelectEnable => {
                // previously selected waveforms stay as they are
                if self.config.variant.supports_wave_select() {
                    self.wave_select = value & 0x20 != 0;
                }
            }
            Register::TimerA => self.timers.set_latch(Timer::A, value, self.sink.as_mut()),
            Register::TimerB => self.timers.set_latch(Timer::B, value, self.sink.as_mut()),
            Register::TimerControl => self.write_timer_control(value),
            Register::Mode => self.mode = value,
            Register::FlagsMultiplier(slot) => {
                self.channels[slot.channel].set_flags_multiplier(slot.operator, value)
            }
            Register::KslTotalLevel(slot) => self.channels[slot.channel].set_ksl_tl(slot.operator, value),
            Register::AttackDecay(slot) => {
                self.channels[slot.channel].operator_mut(slot.operator).set_attack_decay(value)
            }
            Register::SustainRelease(slot) => {
                self.channels[slot.channel].operator_mut(slot.operator).set_sustain_release(value)
            }
            Register::FnumLow(ch) => {
                let block_fnum = (self.channels[ch].block_fnum() & 0x1f00) | value as u32;
                self.update_block_fnum(ch, block_fnum);
            }
            Register::KeyBlockFnum(ch) => {
                let block_fnum = (((value & 0x1f) as u32) << 8) | (self.channels[ch].block_fnum() & 0xff);
                if value & 0x20 != 0 {
                    self.channels[ch].key_on(KeySource::NOTE);
                } else {
                    self.channels[ch].key_off(KeySource::NOTE);
                }
                self.update_block_fnum(ch, block_fnum);
            }
            Register::Rhythm => self.write_rhythm(value),
            Register::FeedbackConnection(ch) => self.channels[ch].set_feedback_connection(value),
            Register::Waveform(slot) => {
                if self.wave_select {
                    self.channels[slot.channel]
                        .operator_mut(slot.operator)
                        .set_waveform(Waveform::from_register(value));
                }
            }
            Register::Unused => {}
        }
    }

    fn update_block_fnum(&mut self, ch: usize, block_fnum: u32) {
        let note_select = self.mode & MODE_NOTE_SEL != 0;
        self.channels[ch].set_block_fnum(block_fnum, note_select, &self.rates.fn_tab);
    }

    fn write_timer_control(&mut self, value: u8) {
        if value & 0x80 != 0 {
            // IRQ reset leaves the buffer-ready flag alone
            self.status.reset(0x7f & !StatusFlags::BUF_RDY.bits());
            return;
        }
        self.status.reset(value & 0x70);
        self.status.set_mask(!value & 0x78);
        if value & 0x40 == 0 {
            self.timers.set_running(Timer::A, value & 0x01 != 0, self.sink.as_mut());
        }
        if value & 0x20 == 0 {
            self.timers.set_running(Timer::B, value & 0x02 != 0, self.sink.as_mut());
        }
    }

    fn write_rhythm(&mut self, value: u8) {
        self.lfo.set_depth(value);
        self.rhythm = value & 0x3f;
        let enabled = self.rhythm & RHYTHM_ENABLE != 0;
        for voice in RhythmVoice::ALL {
            let keyed = enabled && value & voice.key_bit() != 0;
            for &(ch, op) in voice.slots() {
                let op = self.channels[ch].operator_mut(op);
                if keyed {
                    op.key_on(KeySource::RHYTHM);
                } else {
                    op.key_off(KeySource::RHYTHM);
                }
            }
        }
    }

    /// Report a timer overflow from the host
    ///
    /// Timer B raises status bit 5. Timer A raises bit 6 and, in CSM mode,
    /// keys every channel on and straight off again. Returns the IRQ bit.
    pub fn timer_over(&mut self, timer: Timer) -> u8 {
        match timer {
            Timer::B => self.status.set(StatusFlags::TIMER_B.bits()),
            Timer::A => {
                self.status.set(StatusFlags::TIMER_A.bits());
                if self.mode & MODE_CSM != 0 {
                    for ch in self.channels.iter_mut() {
                        ch.key_on(KeySource::CSM);
                        ch.key_off(KeySource::CSM);
                    }
                }
            }
        }
        self.status.bits() >> 7
    }

    /// Produce one output sample and advance all clocks by one step
    #[inline]
    pub fn next_sample(&mut self) -> i16 {
        self.lfo.advance();
        let am = self.lfo.am();
        let mut output = 0i32;

        for ch in 0..MELODIC_IN_RHYTHM {
            let out = self.channels[ch].synthesize(am);
            self.channel_outputs[ch] = out;
            output += out;
        }

        if self.is_rhythm_enabled() {
            let (melodic, rest) = self.channels.split_at_mut(MELODIC_IN_RHYTHM + 1);
            let mix = rhythm::mix(&mut melodic[MELODIC_IN_RHYTHM], &rest[0], &rest[1], am, self.noise.bit());
            self.channel_outputs[MELODIC_IN_RHYTHM..].fill(mix.bass_drum);
            output += mix.total;
        } else {
            for ch in MELODIC_IN_RHYTHM..NUM_CHANNELS {
                let out = self.channels[ch].synthesize(am);
                self.channel_outputs[ch] = out;
                output += out;
            }
        }

        self.advance();

        if self.config.clamp_output {
            output.clamp(i16::MIN as i32, i16::MAX as i32) as i16
        } else {
            output as i16
        }
    }

    /// Envelope clocks, then phase accumulators, then noise
    fn advance(&mut self) {
        self.eg_clock.accumulate();
        while let Some(counter) = self.eg_clock.next_tick() {
            for ch in self.channels.iter_mut() {
                for op in ch.operators_mut() {
                    op.clock_envelope(counter);
                }
            }
        }

        let pm = self.lfo.pm_index();
        let fn_tab = &self.rates.fn_tab;
        for ch in self.channels.iter_mut() {
            let block_fnum = ch.block_fnum();
            for op in ch.operators_mut() {
                op.advance_phase(block_fnum, pm, fn_tab);
            }
        }

        self.noise.advance();
    }

    /// Lazily generate `count` samples
    pub fn generate(&mut self, count: usize) -> Samples<'_> {
        Samples {
            chip: self,
            remaining: count,
        }
    }

    /// Generate `count` samples into a new buffer
    pub fn generate_samples(&mut self, count: usize) -> Vec<i16> {
        self.generate(count).collect()
    }

    /// Fill a caller-provided buffer
    pub fn update(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Per-channel contributions of the last sample
    ///
    /// In rhythm mode channels 6-8 all report the bass drum.
    pub fn channel_outputs(&self) -> [i32; NUM_CHANNELS] {
        self.channel_outputs
    }

    /// Channel by index (0-8)
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    /// All channels
    pub fn channels(&self) -> &[Channel; NUM_CHANNELS] {
        &self.channels
    }

    /// Construction parameters
    pub fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Derived per-sample increments
    pub fn clock_rates(&self) -> &ClockRates {
        &self.rates
    }

    /// Current noise output bit
    pub fn noise_bit(&self) -> bool {
        self.noise.bit()
    }

    /// Rhythm enable bit of register 0xBD
    pub fn is_rhythm_enabled(&self) -> bool {
        self.rhythm & RHYTHM_ENABLE != 0
    }

    /// Wave select enable bit of register 0x01
    pub fn is_wave_select_enabled(&self) -> bool {
        self.wave_select
    }

    /// CSM mode bit of register 0x08
    pub fn is_csm_enabled(&self) -> bool {
        self.mode & MODE_CSM != 0
    }

    /// Status register
    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    /// Timer latches and run state
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Latched bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// True when every operator is off and fully attenuated
    pub fn is_silent(&self) -> bool {
        self.channels.iter().flat_map(|ch| ch.operators().iter()).all(|op| {
            op.envelope().state() == EnvelopeState::Off
                && op.envelope().attenuation() == MAX_ATT_INDEX as u32
        })
    }
}

impl fmt::Debug for Ym3812 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ym3812")
            .field("config", &self.config)
            .field("address", &self.address)
            .field("wave_select", &self.wave_select)
            .field("mode", &self.mode)
            .field("rhythm", &self.rhythm)
            .field("status", &self.status)
            .field("timers", &self.timers)
            .field("channel_outputs", &self.channel_outputs)
            .finish_non_exhaustive()
    }
}

/// Lazy sample sequence returned by [`Ym3812::generate`]
pub struct Samples<'a> {
    chip: &'a mut Ym3812,
    remaining: usize,
}

impl Iterator for Samples<'_> {
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<i16> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.chip.next_sample())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ym3812::channel::{Connection, CARRIER, MODULATOR};
    use crate::ym3812::config::ChipVariant;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    fn chip() -> Ym3812 {
        Ym3812::with_clocks(3_579_545, 44_100).unwrap()
    }

    /// Channel 0, both operators audible, fast envelope
    fn key_channel0(chip: &mut Ym3812) {
        chip.write_register(0x20, 0x21);
        chip.write_register(0x23, 0x21);
        chip.write_register(0x40, 0x10);
        chip.write_register(0x43, 0x00);
        chip.write_register(0x60, 0xf4);
        chip.write_register(0x63, 0xf4);
        chip.write_register(0x80, 0x2f);
        chip.write_register(0x83, 0x2f);
        chip.write_register(0xa0, 0x41);
        chip.write_register(0xb0, 0x32);
    }

    #[test]
    fn test_reset_state() {
        let chip = chip();
        assert!(chip.is_silent());
        assert!(!chip.is_rhythm_enabled());
        assert!(!chip.is_wave_select_enabled());
        assert_eq!(chip.status().mask(), 0x78);
        for ch in chip.channels() {
            assert_eq!(ch.connection(), Connection::ModulationBus);
            assert_eq!(ch.operator(MODULATOR).waveform(), Waveform::Sine);
        }
    }

    #[test]
    fn test_reset_chip_is_silent() {
        let mut chip = chip();
        assert!(chip.generate(4096).all(|s| s == 0));
    }

    #[test]
    fn test_bus_latches_address() {
        let mut chip = chip();
        chip.write(0, 0x20);
        assert_eq!(chip.address(), 0x20);
        chip.write(1, 0x0f);
        assert_eq!(chip.channel(0).operator(MODULATOR).multiplier(), 30);
        assert_eq!(chip.read(1), 0xff);
        assert_eq!(chip.read(0), 0x06);
    }

    #[test]
    fn test_key_on_starts_attack() {
        let mut chip = chip();
        key_channel0(&mut chip);
        assert_eq!(chip.channel(0).operator(CARRIER).envelope().state(), EnvelopeState::Attack);
        let samples = chip.generate_samples(2048);
        assert!(samples.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_key_off_releases() {
        let mut chip = chip();
        key_channel0(&mut chip);
        chip.generate_samples(1024);
        chip.write_register(0xb0, 0x12);
        assert_eq!(chip.channel(0).operator(CARRIER).envelope().state(), EnvelopeState::Release);
        chip.generate_samples(44_100);
        assert!(chip.is_silent());
    }

    #[test]
    fn test_wave_select_gate() {
        let mut chip = chip();
        chip.write_register(0xe0, 0x02);
        assert_eq!(chip.channel(0).operator(MODULATOR).waveform(), Waveform::Sine);
        chip.write_register(0x01, 0x20);
        chip.write_register(0xe0, 0x02);
        assert_eq!(chip.channel(0).operator(MODULATOR).waveform(), Waveform::AbsSine);
        // disabling keeps the selected waveform and ignores further writes
        chip.write_register(0x01, 0x00);
        assert_eq!(chip.channel(0).operator(MODULATOR).waveform(), Waveform::AbsSine);
        chip.write_register(0xe0, 0x03);
        assert_eq!(chip.channel(0).operator(MODULATOR).waveform(), Waveform::AbsSine);
    }

    #[test]
    fn test_ym3526_has_no_wave_select() {
        let mut chip = Ym3812::new(ChipConfig {
            variant: ChipVariant::Ym3526,
            ..ChipConfig::default()
        })
        .unwrap();
        chip.write_register(0x01, 0x20);
        chip.write_register(0xe0, 0x01);
        assert!(!chip.is_wave_select_enabled());
        assert_eq!(chip.channel(0).operator(MODULATOR).waveform(), Waveform::Sine);
    }

    #[test]
    fn test_idempotent_writes() {
        let writes = [
            (0x20u8, 0xe3u8),
            (0x40, 0x92),
            (0x63, 0xa7),
            (0x83, 0x5c),
            (0xa4, 0x98),
            (0xb4, 0x2d),
            (0xc4, 0x0b),
            (0xbd, 0xff),
        ];
        for (reg, value) in writes {
            let mut chip = chip();
            chip.write_register(0x01, 0x20);
            chip.write_register(reg, value);
            let first = chip.channels().clone();
            chip.write_register(reg, value);
            assert_eq!(chip.channels(), &first, "register {reg:02X}");
        }
    }

    #[test]
    fn test_rhythm_keys_use_their_own_source() {
        let mut chip = chip();
        chip.write_register(0xb6, 0x20);
        chip.write_register(0xbd, 0x30);
        chip.write_register(0xbd, 0x20);
        // note key still holds channel 6
        assert_eq!(chip.channel(6).operator(MODULATOR).envelope().state(), EnvelopeState::Attack);
        chip.write_register(0xb6, 0x00);
        assert_eq!(chip.channel(6).operator(MODULATOR).envelope().state(), EnvelopeState::Release);
    }

    #[test]
    fn test_rhythm_disable_releases_voices() {
        let mut chip = chip();
        chip.write_register(0xbd, 0x3f);
        for (ch, op) in [(6, 0), (6, 1), (7, 0), (7, 1), (8, 0), (8, 1)] {
            assert_eq!(chip.channel(ch).operator(op).envelope().state(), EnvelopeState::Attack);
        }
        chip.write_register(0xbd, 0x1f);
        assert!(!chip.is_rhythm_enabled());
        for (ch, op) in [(6, 0), (6, 1), (7, 0), (7, 1), (8, 0), (8, 1)] {
            assert_eq!(chip.channel(ch).operator(op).envelope().state(), EnvelopeState::Release);
        }
    }

    #[derive(Clone, Default)]
    struct SharedRecorder(Arc<Mutex<Vec<(Timer, Option<Duration>)>>>);

    impl TimerSink for SharedRecorder {
        fn start(&mut self, timer: Timer, period: Duration) {
            self.0.lock().push((timer, Some(period)));
        }

        fn stop(&mut self, timer: Timer) {
            self.0.lock().push((timer, None));
        }
    }

    #[test]
    fn test_timer_control_and_irq() {
        let mut chip = chip();
        let recorder = SharedRecorder::default();
        chip.set_timer_sink(Box::new(recorder.clone()));

        chip.write_register(0x02, 0xff);
        chip.write_register(0x04, 0x01);
        assert_eq!(
            recorder.0.lock().as_slice(),
            &[(Timer::A, Some(Duration::from_micros(80)))]
        );

        assert_eq!(chip.timer_over(Timer::A), 1);
        assert_eq!(chip.read(0), 0xc0 | 0x06);

        // IRQ reset
        chip.write_register(0x04, 0x80);
        assert_eq!(chip.read(0), 0x06);

        // masked timer B raises its flag without IRQ
        chip.write_register(0x04, 0x21);
        assert_eq!(chip.timer_over(Timer::B), 0);
        assert_eq!(chip.status().bits() & 0x20, 0x20);

        chip.write_register(0x04, 0x00);
        assert_eq!(recorder.0.lock().last(), Some(&(Timer::A, None)));
    }

    #[test]
    fn test_csm_keys_all_channels() {
        let mut chip = chip();
        chip.write_register(0x08, 0x80);
        chip.timer_over(Timer::A);
        for ch in chip.channels() {
            for op in ch.operators() {
                // keyed on and straight off again
                assert_eq!(op.envelope().state(), EnvelopeState::Release);
                assert!(op.key().is_empty());
            }
        }
    }

    #[test]
    fn test_timer_b_never_keys() {
        let mut chip = chip();
        chip.write_register(0x08, 0x80);
        chip.timer_over(Timer::B);
        assert!(chip.is_silent());
    }

    #[test]
    fn test_channel_taps_sum_to_output() {
        let mut chip = chip();
        key_channel0(&mut chip);
        for _ in 0..2000 {
            let sample = chip.next_sample();
            let taps: i32 = chip.channel_outputs().iter().sum();
            assert_eq!(taps.clamp(-32768, 32767) as i16, sample);
        }
    }

    #[test]
    fn test_generate_is_exact_size() {
        let mut chip = chip();
        let samples = chip.generate(77);
        assert_eq!(samples.len(), 77);
        assert_eq!(samples.count(), 77);
    }

    #[test]
    fn test_update_matches_generate() {
        let mut a = chip();
        let mut b = chip();
        key_channel0(&mut a);
        key_channel0(&mut b);
        let mut buffer = [0i16; 600];
        a.update(&mut buffer);
        assert_eq!(buffer.to_vec(), b.generate_samples(600));
    }

    #[test]
    fn test_chips_are_independent() {
        let mut a = chip();
        let mut b = chip();
        key_channel0(&mut a);
        let out_a = a.generate_samples(1024);
        let out_b = b.generate_samples(1024);
        assert!(out_a.iter().any(|&s| s != 0));
        assert!(out_b.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_invalid_config_fails() {
        assert!(Ym3812::with_clocks(0, 44_100).is_err());
    }

    #[test]
    fn test_wrapping_output() {
        let mut clamped = chip();
        let mut wrapped = Ym3812::new(ChipConfig {
            clamp_output: false,
            ..ChipConfig::default()
        })
        .unwrap();
        // nine parallel channels at full level overflow 16 bits
        for opl in [&mut clamped, &mut wrapped] {
            for ch in 0..9u8 {
                let (m, c) = match ch {
                    0..=2 => (ch, ch + 3),
                    3..=5 => (ch + 5, ch + 8),
                    _ => (ch + 10, ch + 13),
                };
                opl.write_register(0x20 + m, 0x21);
                opl.write_register(0x20 + c, 0x21);
                opl.write_register(0x60 + m, 0xf0);
                opl.write_register(0x60 + c, 0xf0);
                opl.write_register(0xc0 + ch, 0x01);
                opl.write_register(0xa0 + ch, 0x41);
                opl.write_register(0xb0 + ch, 0x32);
            }
        }
        let a = clamped.generate_samples(256);
        let b = wrapped.generate_samples(256);
        assert!(a.iter().any(|&s| s == i16::MAX || s == i16::MIN));
        assert_ne!(a, b);
    }
}
