//! Envelope Generator
//!
//! Per-operator attenuation state machine clocked by the shared envelope
//! counter. Rates are combined with the key scale offset and resolved to a
//! counter shift (how often the operator fires) and an increment pattern
//! (by how much, on each of eight consecutive firings).

use super::constants::{
    ATTACK_FAST_RATE, ATTACK_FAST_SELECT, EG_INC, EG_RATE_SELECT, EG_RATE_SHIFT, EG_SH,
    MAX_ATT_INDEX, MIN_ATT_INDEX, SL_TAB,
};

/// Envelope phase, ordered the way key-off compares them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnvelopeState {
    /// Resting, fully attenuated
    #[default]
    Off = 0,
    /// Key released, rising towards silence
    Release = 1,
    /// Holding (or slowly releasing in percussive mode)
    Sustain = 2,
    /// Falling from peak to the sustain level
    Decay = 3,
    /// Exponential approach to full volume
    Attack = 4,
}

/// Resolved envelope rate: counter shift plus increment pattern offset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rate {
    shift: u8,
    select: u8,
}

impl Rate {
    /// Rate for a combined `rate + ksr` index
    #[inline]
    pub fn from_index(index: u32) -> Self {
        let index = index as usize;
        Self {
            shift: EG_RATE_SHIFT[index],
            select: EG_RATE_SELECT[index],
        }
    }

    /// Attack rate for a combined index; the two fastest rates skip the table
    #[inline]
    pub fn attack(index: u32) -> Self {
        if index < ATTACK_FAST_RATE {
            Self::from_index(index)
        } else {
            Self {
                shift: 0,
                select: ATTACK_FAST_SELECT,
            }
        }
    }

    /// Counter shift
    pub fn shift(&self) -> u8 {
        self.shift
    }

    /// Increment pattern offset into the increment table
    pub fn select(&self) -> u8 {
        self.select
    }

    /// Increment applied on envelope clock `counter`, if this rate fires on it
    #[inline]
    pub fn increment(&self, counter: u32) -> Option<i32> {
        let mask = (1u32 << self.shift) - 1;
        if counter & mask != 0 {
            return None;
        }
        let step = ((counter >> self.shift) & 7) as usize;
        Some(EG_INC[self.select as usize + step] as i32)
    }
}

/// Decode a 4-bit attack/decay/release nibble to a base rate index
#[inline]
pub fn rate_index(nibble: u8) -> u32 {
    let nibble = (nibble & 0x0f) as u32;
    if nibble != 0 {
        16 + (nibble << 2)
    } else {
        0
    }
}

/// Per-operator envelope state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    state: EnvelopeState,
    volume: i32,
    // base rate indices (0 = infinite)
    ar: u32,
    dr: u32,
    rr: u32,
    // key scale offset added to every rate
    ksr: u32,
    sustain_level: u32,
    sustained: bool,
    attack: Rate,
    decay: Rate,
    release: Rate,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// Create a silent envelope in the `Off` state
    pub fn new() -> Self {
        Self {
            state: EnvelopeState::Off,
            volume: MAX_ATT_INDEX,
            ar: 0,
            dr: 0,
            rr: 0,
            ksr: 0,
            sustain_level: 0,
            sustained: false,
            attack: Rate::attack(0),
            decay: Rate::from_index(0),
            release: Rate::from_index(0),
        }
    }

    /// Current phase
    #[inline]
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current attenuation, 0 (loudest) to 511 (silent)
    #[inline]
    pub fn attenuation(&self) -> u32 {
        self.volume as u32
    }

    /// Sustain level in attenuation units
    pub fn sustain_level(&self) -> u32 {
        self.sustain_level
    }

    /// Current key scale offset
    pub fn key_scale(&self) -> u32 {
        self.ksr
    }

    /// Resolved attack rate
    pub fn attack_rate(&self) -> Rate {
        self.attack
    }

    /// Resolved decay rate
    pub fn decay_rate(&self) -> Rate {
        self.decay
    }

    /// Resolved release rate
    pub fn release_rate(&self) -> Rate {
        self.release
    }

    /// Non-percussive mode holds the sustain level until key-off
    pub fn is_sustained(&self) -> bool {
        self.sustained
    }

    /// EG-type bit; can change mid-sustain without leaving the phase
    #[inline]
    pub fn set_sustained(&mut self, sustained: bool) {
        self.sustained = sustained;
    }

    /// Register 0x60 group: attack rate (bits 4-7), decay rate (bits 0-3)
    pub fn set_attack_decay(&mut self, value: u8) {
        self.ar = rate_index(value >> 4);
        self.attack = Rate::attack(self.ar + self.ksr);
        self.dr = rate_index(value);
        self.decay = Rate::from_index(self.dr + self.ksr);
    }

    /// Register 0x80 group: sustain level (bits 4-7), release rate (bits 0-3)
    pub fn set_sustain_release(&mut self, value: u8) {
        self.sustain_level = SL_TAB[(value >> 4) as usize];
        self.rr = rate_index(value);
        self.release = Rate::from_index(self.rr + self.ksr);
    }

    /// Apply a new key scale offset, re-resolving every rate when it changes
    pub fn set_key_scale(&mut self, ksr: u32) {
        if self.ksr == ksr {
            return;
        }
        self.ksr = ksr;
        self.attack = Rate::attack(self.ar + ksr);
        self.decay = Rate::from_index(self.dr + ksr);
        self.release = Rate::from_index(self.rr + ksr);
    }

    /// Enter attack (phase restart is handled by the operator)
    #[inline]
    pub fn start_attack(&mut self) {
        self.state = EnvelopeState::Attack;
    }

    /// Enter release unless already releasing or off
    #[inline]
    pub fn start_release(&mut self) {
        if self.state > EnvelopeState::Release {
            self.state = EnvelopeState::Release;
        }
    }

    /// Return to the post-reset resting condition
    pub fn silence(&mut self) {
        self.state = EnvelopeState::Off;
        self.volume = MAX_ATT_INDEX;
    }

    /// Evaluate one envelope clock
    #[inline]
    pub fn clock(&mut self, counter: u32) {
        match self.state {
            EnvelopeState::Attack => {
                if let Some(inc) = self.attack.increment(counter) {
                    self.volume += (!self.volume * inc) >> 3;
                    if self.volume <= MIN_ATT_INDEX {
                        self.volume = MIN_ATT_INDEX;
                        self.state = EnvelopeState::Decay;
                    }
                }
            }
            EnvelopeState::Decay => {
                if let Some(inc) = self.decay.increment(counter) {
                    self.volume += inc;
                    if self.volume as u32 >= self.sustain_level {
                        self.state = EnvelopeState::Sustain;
                    }
                }
            }
            EnvelopeState::Sustain => {
                // percussive tones keep releasing while nominally sustaining
                if !self.sustained {
                    if let Some(inc) = self.release.increment(counter) {
                        self.volume += inc;
                        if self.volume >= MAX_ATT_INDEX {
                            self.volume = MAX_ATT_INDEX;
                        }
                    }
                }
            }
            EnvelopeState::Release => {
                if let Some(inc) = self.release.increment(counter) {
                    self.volume += inc;
                    if self.volume >= MAX_ATT_INDEX {
                        self.volume = MAX_ATT_INDEX;
                        self.state = EnvelopeState::Off;
                    }
                }
            }
            EnvelopeState::Off => {}
        }
    }
}

/// Shared envelope clock
///
/// A 16.16 accumulator advanced once per output sample; each overflow
/// produces one envelope counter tick for every operator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeClock {
    timer: u32,
    add: u32,
    counter: u32,
}

const EG_TIMER_OVERFLOW: u32 = 1 << EG_SH;

impl EnvelopeClock {
    /// Create a clock advancing by `add` per sample
    pub fn new(add: u32) -> Self {
        Self {
            timer: 0,
            add,
            counter: 0,
        }
    }

    /// Zero the accumulator and the counter
    pub fn reset(&mut self) {
        self.timer = 0;
        self.counter = 0;
    }

    /// Current envelope counter
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Add one sample worth of time
    #[inline]
    pub fn accumulate(&mut self) {
        self.timer = self.timer.wrapping_add(self.add);
    }

    /// Next due envelope tick, if the accumulator has overflowed
    #[inline]
    pub fn next_tick(&mut self) -> Option<u32> {
        if self.timer < EG_TIMER_OVERFLOW {
            return None;
        }
        self.timer -= EG_TIMER_OVERFLOW;
        self.counter = self.counter.wrapping_add(1);
        Some(self.counter)
    }
}
