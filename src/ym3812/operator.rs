//! Operator (Slot)
//!
//! One sine generator with its own phase accumulator, envelope and level
//! parameters. Two operators form a channel; the channel decides how their
//! outputs are routed.

use bitflags::bitflags;

use super::constants::{FREQ_MASK, FREQ_SH, LFO_PM_TABLE, MUL_TAB};
use super::envelope::Envelope;
use super::tables::{tables, Waveform};

bitflags! {
    /// Sources holding an operator's key on; the operator sounds while any is set
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeySource: u8 {
        /// Channel key-on bit (B0-B8 bit 5)
        const NOTE = 0x01;
        /// Rhythm voice key bit (register 0xBD)
        const RHYTHM = 0x02;
        /// CSM auto key-on on timer A overflow
        const CSM = 0x04;
    }
}

/// Frequency-number to phase increment table of one chip
///
/// Entry `i` is the 16.16 per-sample increment of fnum `i` at block 7 with
/// a doubled multiplier of 1. Lower blocks shift it right.
pub type FnumTable = [u32; 1024];

/// Operator state and parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    /// Phase accumulator (16.16, 10-bit sine index in the integer part)
    phase: u32,
    /// Phase increment per sample
    increment: u32,
    /// Doubled frequency multiplier
    mul: u32,
    /// Key scale rate shift: 0 (KSR on) or 2 (KSR off)
    ksr_shift: u8,
    /// Total level in attenuation units
    tl: u32,
    /// Total level plus key scale level
    tll: u32,
    /// Key scale level shift (31 disables it)
    ksl_shift: u8,
    /// Tremolo enable mask
    am_mask: u32,
    vibrato: bool,
    waveform: Waveform,
    key: KeySource,
    envelope: Envelope,
    /// Last two outputs of the modulator, used for feedback
    history: [i32; 2],
}

impl Default for Operator {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator {
    /// Create an operator with every register cleared
    pub fn new() -> Self {
        Self {
            phase: 0,
            increment: 0,
            mul: 0,
            ksr_shift: 0,
            tl: 0,
            tll: 0,
            ksl_shift: 0,
            am_mask: 0,
            vibrato: false,
            waveform: Waveform::Sine,
            key: KeySource::empty(),
            envelope: Envelope::new(),
            history: [0; 2],
        }
    }

    /// Envelope generator
    #[inline]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Phase accumulator
    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Phase increment per sample
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Doubled frequency multiplier
    pub fn multiplier(&self) -> u32 {
        self.mul
    }

    /// Selected waveform
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Active key sources
    pub fn key(&self) -> KeySource {
        self.key
    }

    /// Total level plus key scale level
    pub fn total_level(&self) -> u32 {
        self.tll
    }

    /// Vibrato enabled
    pub fn has_vibrato(&self) -> bool {
        self.vibrato
    }

    /// Tremolo enabled
    pub fn has_tremolo(&self) -> bool {
        self.am_mask != 0
    }

    /// Feedback history (older, newer)
    pub fn history(&self) -> [i32; 2] {
        self.history
    }

    /// Register 0x20 group: tremolo, vibrato, EG type, KSR, multiplier
    ///
    /// The caller refreshes the frequency through [`Operator::update_frequency`].
    pub fn set_flags_multiplier(&mut self, value: u8) {
        self.mul = MUL_TAB[(value & 0x0f) as usize] as u32;
        self.ksr_shift = if value & 0x10 != 0 { 0 } else { 2 };
        self.envelope.set_sustained(value & 0x20 != 0);
        self.vibrato = value & 0x40 != 0;
        self.am_mask = if value & 0x80 != 0 { !0 } else { 0 };
    }

    /// Register 0x40 group: key scale level (bits 6-7), total level (bits 0-5)
    pub fn set_ksl_tl(&mut self, value: u8, ksl_base: u32) {
        let ksl = value >> 6;
        // 0 / 1.5 / 3 / 6 dB per octave
        self.ksl_shift = if ksl != 0 { 3 - ksl } else { 31 };
        self.tl = ((value & 0x3f) as u32) << 2;
        self.refresh_total_level(ksl_base);
    }

    /// Recompute total level after the channel's key scale base changed
    #[inline]
    pub fn refresh_total_level(&mut self, ksl_base: u32) {
        self.tll = self.tl + (ksl_base >> self.ksl_shift);
    }

    /// Register 0x60 group
    pub fn set_attack_decay(&mut self, value: u8) {
        self.envelope.set_attack_decay(value);
    }

    /// Register 0x80 group
    pub fn set_sustain_release(&mut self, value: u8) {
        self.envelope.set_sustain_release(value);
    }

    /// Register 0xE0 group
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Refresh the phase increment and key scale rate from channel state
    #[inline]
    pub fn update_frequency(&mut self, fc: u32, kcode: u8) {
        self.increment = fc.wrapping_mul(self.mul);
        self.envelope.set_key_scale((kcode >> self.ksr_shift) as u32);
    }

    /// Assert a key source, restarting phase and envelope on the first one
    #[inline]
    pub fn key_on(&mut self, source: KeySource) {
        if self.key.is_empty() {
            self.phase = 0;
            self.envelope.start_attack();
        }
        self.key |= source;
    }

    /// Clear a key source, entering release once none remain
    #[inline]
    pub fn key_off(&mut self, source: KeySource) {
        if self.key.is_empty() {
            return;
        }
        self.key.remove(source);
        if self.key.is_empty() {
            self.envelope.start_release();
        }
    }

    /// Reset-time defaults not covered by register clears
    pub fn silence(&mut self) {
        self.waveform = Waveform::Sine;
        self.envelope.silence();
    }

    /// Total attenuation for this sample (envelope, level, tremolo)
    #[inline]
    pub fn volume(&self, lfo_am: u32) -> u32 {
        self.tll + self.envelope.attenuation() + (lfo_am & self.am_mask)
    }

    /// Clock the envelope once
    #[inline]
    pub fn clock_envelope(&mut self, counter: u32) {
        self.envelope.clock(counter);
    }

    /// Advance the phase accumulator one sample
    ///
    /// With vibrato enabled the LFO perturbs the channel's block/fnum
    /// before the increment is derived; a zero table entry keeps the
    /// precomputed increment.
    #[inline]
    pub fn advance_phase(&mut self, block_fnum: u32, lfo_pm: usize, fn_tab: &FnumTable) {
        if self.vibrato {
            let fnum_lfo = ((block_fnum & 0x0380) >> 7) as usize;
            let offset = LFO_PM_TABLE[lfo_pm + 16 * fnum_lfo];
            if offset != 0 {
                let block_fnum = block_fnum.wrapping_add_signed(offset as i32);
                let block = (block_fnum & 0x1c00) >> 10;
                let inc = (fn_tab[(block_fnum & 0x03ff) as usize] >> (7 - block)).wrapping_mul(self.mul);
                self.phase = self.phase.wrapping_add(inc);
                return;
            }
        }
        self.phase = self.phase.wrapping_add(self.increment);
    }

    /// Carrier output: `pm` is a sine index offset in whole entries
    #[inline]
    pub fn carrier_output(&self, env: u32, pm: i32) -> i32 {
        let index = (self.phase & !FREQ_MASK).wrapping_add((pm as u32).wrapping_shl(FREQ_SH));
        tables().lookup(self.waveform, ((index as i32) >> FREQ_SH) as usize, env)
    }

    /// Output for an externally derived phase (rhythm voices)
    #[inline]
    pub fn output_at(&self, phase: u32, env: u32) -> i32 {
        tables().lookup(self.waveform, (phase >> FREQ_SH) as usize, env)
    }

    /// Modulator pass: shift the feedback history and compute a new output
    ///
    /// Returns the output produced one sample ago, which is what the
    /// channel routes onward. `feedback` is the channel's feedback shift
    /// (0 disables it).
    #[inline]
    pub fn modulate(&mut self, env: u32, quiet: u32, feedback: u8) -> i32 {
        let sum = self.history[0] + self.history[1];
        self.history[0] = self.history[1];
        self.history[1] = 0;
        if env < quiet {
            let fb = if feedback != 0 { sum << feedback } else { 0 };
            let index = (self.phase & !FREQ_MASK).wrapping_add(fb as u32);
            self.history[1] =
                tables().lookup(self.waveform, ((index as i32) >> FREQ_SH) as usize, env);
        }
        self.history[0]
    }
}
