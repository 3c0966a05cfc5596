//! Modulation generators shared by all operators
//!
//! - LFO unit (tremolo amplitude and vibrato phase index)
//! - Noise generator (23-bit LFSR used by the rhythm voices)

use super::constants::{FREQ_MASK, FREQ_SH, LFO_AM_TABLE, LFO_AM_TAB_ELEMENTS, LFO_SH};

const LFO_AM_PERIOD: u32 = (LFO_AM_TAB_ELEMENTS as u32) << LFO_SH;

/// Tremolo and vibrato counters
///
/// Both counters are 8.24 fixed point. The tremolo counter walks the
/// 210-entry triangle table; the top three bits of the vibrato counter form
/// the column of the vibrato table, offset by 8 for the deep setting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lfo {
    am_cnt: u32,
    am_inc: u32,
    pm_cnt: u32,
    pm_inc: u32,
    am_deep: bool,
    pm_depth_range: usize,
    // values for the current sample
    am: u32,
    pm: usize,
}

impl Lfo {
    /// Create an LFO with per-sample increments for both counters
    pub fn new(am_inc: u32, pm_inc: u32) -> Self {
        Self {
            am_inc,
            pm_inc,
            ..Self::default()
        }
    }

    /// Depth bits of register 0xBD (bit 7 tremolo 4.8 dB, bit 6 vibrato 14 cent)
    #[inline]
    pub fn set_depth(&mut self, value: u8) {
        self.am_deep = value & 0x80 != 0;
        self.pm_depth_range = if value & 0x40 != 0 { 8 } else { 0 };
    }

    /// Deep tremolo selected
    pub fn is_am_deep(&self) -> bool {
        self.am_deep
    }

    /// Deep vibrato selected
    pub fn is_pm_deep(&self) -> bool {
        self.pm_depth_range != 0
    }

    /// Advance one sample and latch the new modulation values
    #[inline]
    pub fn advance(&mut self) {
        self.am_cnt = self.am_cnt.wrapping_add(self.am_inc);
        if self.am_cnt >= LFO_AM_PERIOD {
            self.am_cnt -= LFO_AM_PERIOD;
        }
        let level = LFO_AM_TABLE[(self.am_cnt >> LFO_SH) as usize] as u32;
        self.am = if self.am_deep { level } else { level >> 2 };

        self.pm_cnt = self.pm_cnt.wrapping_add(self.pm_inc);
        self.pm = (((self.pm_cnt >> LFO_SH) & 7) as usize) | self.pm_depth_range;
    }

    /// Tremolo attenuation for the current sample
    #[inline]
    pub fn am(&self) -> u32 {
        self.am
    }

    /// Vibrato table column for the current sample
    #[inline]
    pub fn pm_index(&self) -> usize {
        self.pm
    }
}

/// Noise generator
///
/// 23-bit shift register clocked at the chip's native sample rate. The
/// output tap is bit 0 after each shift, one step ahead of the hardware's
/// bit 22 but with the same sequence and period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseGenerator {
    rng: u32,
    pos: u32,
    step: u32,
}

/// Feedback mask applied when the outgoing bit is set
const NOISE_FEEDBACK: u32 = 0x80_0302;

impl NoiseGenerator {
    /// Create a generator advancing `step` (16.16) register shifts per sample
    pub fn new(step: u32) -> Self {
        Self { rng: 1, pos: 0, step }
    }

    /// Reseed the shift register
    pub fn reset(&mut self) {
        self.rng = 1;
    }

    /// Current output bit
    #[inline]
    pub fn bit(&self) -> bool {
        self.rng & 1 != 0
    }

    /// Raw shift register contents
    pub fn state(&self) -> u32 {
        self.rng
    }

    /// Clock the register once
    #[inline]
    pub fn shift(&mut self) {
        if self.rng & 1 != 0 {
            self.rng ^= NOISE_FEEDBACK;
        }
        self.rng >>= 1;
    }

    /// Advance one output sample
    #[inline]
    pub fn advance(&mut self) {
        self.pos = self.pos.wrapping_add(self.step);
        let shifts = self.pos >> FREQ_SH;
        self.pos &= FREQ_MASK;
        for _ in 0..shifts {
            self.shift();
        }
    }
}
