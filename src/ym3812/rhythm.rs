//! Rhythm Mode
//!
//! With bit 5 of register 0xBD set, channels 6-8 stop behaving as melodic
//! channels and drive five percussion voices instead:
//!
//! | Voice       | Envelope        | Phase source                          |
//! |-------------|-----------------|---------------------------------------|
//! | Bass drum   | ch 6 op 1 + 2   | ch 6 (normal 2-op FM, see below)      |
//! | High hat    | ch 7 op 1       | ch 7 op 1 combined with ch 8 op 2     |
//! | Snare drum  | ch 7 op 2       | ch 7 op 1 bit 8, noise                |
//! | Tom tom     | ch 8 op 1       | ch 8 op 1                             |
//! | Top cymbal  | ch 8 op 2       | ch 7 op 1 combined with ch 8 op 2     |
//!
//! Every voice is output at twice the level of a melodic channel.
//!
//! The bass drum follows the channel 6 connection bit: serial works like a
//! normal channel, parallel drops operator 1 entirely (only operator 2 is
//! heard).

use super::channel::{Channel, Connection, CARRIER, MODULATOR};
use super::constants::{ENV_QUIET, FREQ_SH};

/// The five rhythm voices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RhythmVoice {
    /// Bass drum (channel 6, both operators)
    BassDrum,
    /// High hat (channel 7 operator 1)
    HighHat,
    /// Snare drum (channel 7 operator 2)
    SnareDrum,
    /// Tom tom (channel 8 operator 1)
    TomTom,
    /// Top cymbal (channel 8 operator 2)
    TopCymbal,
}

impl RhythmVoice {
    /// All voices in register bit order of the key handling
    pub const ALL: [RhythmVoice; 5] = [
        RhythmVoice::BassDrum,
        RhythmVoice::HighHat,
        RhythmVoice::SnareDrum,
        RhythmVoice::TomTom,
        RhythmVoice::TopCymbal,
    ];

    /// Key bit in register 0xBD
    pub fn key_bit(self) -> u8 {
        match self {
            RhythmVoice::BassDrum => 0x10,
            RhythmVoice::SnareDrum => 0x08,
            RhythmVoice::TomTom => 0x04,
            RhythmVoice::TopCymbal => 0x02,
            RhythmVoice::HighHat => 0x01,
        }
    }

    /// (channel, operator) slots keyed by this voice
    pub fn slots(self) -> &'static [(usize, usize)] {
        match self {
            RhythmVoice::BassDrum => &[(6, MODULATOR), (6, CARRIER)],
            RhythmVoice::HighHat => &[(7, MODULATOR)],
            RhythmVoice::SnareDrum => &[(7, CARRIER)],
            RhythmVoice::TomTom => &[(8, MODULATOR)],
            RhythmVoice::TopCymbal => &[(8, CARRIER)],
        }
    }
}

impl std::fmt::Display for RhythmVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RhythmVoice::BassDrum => "BD",
            RhythmVoice::HighHat => "HH",
            RhythmVoice::SnareDrum => "SD",
            RhythmVoice::TomTom => "TOM",
            RhythmVoice::TopCymbal => "CY",
        };
        write!(f, "{name}")
    }
}

#[inline]
fn bit(phase: u32, n: u32) -> bool {
    (phase >> FREQ_SH) >> n & 1 != 0
}

/// Frequency part shared by high hat and top cymbal (channel 7 operator 1)
#[inline]
fn base_gate(ch7_op1_phase: u32) -> bool {
    (bit(ch7_op1_phase, 2) ^ bit(ch7_op1_phase, 7)) | bit(ch7_op1_phase, 3)
}

/// Enable gate derived from channel 8 operator 2
#[inline]
fn enable_gate(ch8_op2_phase: u32) -> bool {
    bit(ch8_op2_phase, 3) ^ bit(ch8_op2_phase, 5)
}

/// High hat sine index
///
/// Frequency alone selects 0x0d0 or 0x234; noise then moves 0x234 to
/// 0x2d0 and 0x0d0 to 0x034.
#[inline]
pub fn high_hat_phase(ch7_op1_phase: u32, ch8_op2_phase: u32, noise: bool) -> u32 {
    let mut phase = if base_gate(ch7_op1_phase) {
        0x200 | (0xd0 >> 2)
    } else {
        0xd0
    };
    if enable_gate(ch8_op2_phase) {
        phase = 0x200 | (0xd0 >> 2);
    }
    if phase & 0x200 != 0 {
        if noise {
            phase = 0x200 | 0xd0;
        }
    } else if noise {
        phase = 0xd0 >> 2;
    }
    phase
}

/// Snare drum sine index: 0x100 or 0x200 from channel 7 operator 1 bit 8,
/// flipped by the noise bit
#[inline]
pub fn snare_drum_phase(ch7_op1_phase: u32, noise: bool) -> u32 {
    let phase = if bit(ch7_op1_phase, 8) { 0x200 } else { 0x100 };
    if noise {
        phase ^ 0x100
    } else {
        phase
    }
}

/// Top cymbal sine index: 0x100 or 0x300
#[inline]
pub fn top_cymbal_phase(ch7_op1_phase: u32, ch8_op2_phase: u32) -> u32 {
    if base_gate(ch7_op1_phase) || enable_gate(ch8_op2_phase) {
        0x300
    } else {
        0x100
    }
}

/// Rhythm contribution of one sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RhythmMix {
    /// Bass drum alone
    pub bass_drum: i32,
    /// All five voices
    pub total: i32,
}

/// Mix the five rhythm voices for the current sample
///
/// Only channel 6 is mutated (its modulator feedback history); the other
/// two channels provide envelopes and phases.
pub fn mix(bd: &mut Channel, ch7: &Channel, ch8: &Channel, lfo_am: u32, noise: bool) -> RhythmMix {
    let mut bus = 0;
    let mut bass_drum = 0;

    let feedback = bd.feedback();
    let connection = bd.connection();
    let modulator = bd.operator_mut(MODULATOR);
    let env = modulator.volume(lfo_am);
    let routed = modulator.modulate(env, ENV_QUIET, feedback);
    if connection == Connection::ModulationBus {
        bus = routed;
    }

    let carrier = bd.operator(CARRIER);
    let env = carrier.volume(lfo_am);
    if env < ENV_QUIET {
        bass_drum = carrier.carrier_output(env, bus) * 2;
    }

    let mut total = bass_drum;
    let hh = ch7.operator(MODULATOR);
    let sd = ch7.operator(CARRIER);
    let tom = ch8.operator(MODULATOR);
    let cy = ch8.operator(CARRIER);

    let env = hh.volume(lfo_am);
    if env < ENV_QUIET {
        let phase = high_hat_phase(hh.phase(), cy.phase(), noise);
        total += hh.output_at(phase << FREQ_SH, env) * 2;
    }

    let env = sd.volume(lfo_am);
    if env < ENV_QUIET {
        let phase = snare_drum_phase(hh.phase(), noise);
        total += sd.output_at(phase << FREQ_SH, env) * 2;
    }

    let env = tom.volume(lfo_am);
    if env < ENV_QUIET {
        total += tom.carrier_output(env, 0) * 2;
    }

    let env = cy.volume(lfo_am);
    if env < ENV_QUIET {
        let phase = top_cymbal_phase(hh.phase(), cy.phase());
        total += cy.output_at(phase << FREQ_SH, env) * 2;
    }

    RhythmMix { bass_drum, total }
}
