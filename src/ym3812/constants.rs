//! YM3812 Hardware Constants
//!
//! Fixed-point layout and the constant lookup tables measured on real chips:
//! envelope rate shifts/selectors, key-scale levels, sustain levels,
//! frequency multipliers and the two LFO waveforms.

/// 16.16 fixed point for phase accumulators
pub const FREQ_SH: u32 = 16;
/// 16.16 fixed point for the envelope timer
pub const EG_SH: u32 = 16;
/// 8.24 fixed point for the LFO counters
pub const LFO_SH: u32 = 24;

/// Fractional part of a 16.16 phase accumulator
pub const FREQ_MASK: u32 = (1 << FREQ_SH) - 1;

/// Envelope output resolution in bits
pub const ENV_BITS: u32 = 10;
/// Weight of one attenuation step in the 'decibel' scale
pub const ENV_STEP: f64 = 128.0 / (1 << ENV_BITS) as f64;

/// Silent end of the attenuation range
pub const MAX_ATT_INDEX: i32 = (1 << (ENV_BITS - 1)) - 1;
/// Loudest end of the attenuation range
pub const MIN_ATT_INDEX: i32 = 0;

/// Sine table index width (one full period)
pub const SIN_BITS: u32 = 10;
/// Sine table length
pub const SIN_LEN: usize = 1 << SIN_BITS;
/// Sine table index mask
pub const SIN_MASK: usize = SIN_LEN - 1;

/// Attenuation table resolution (8 bits addressing, as the real chip)
pub const TL_RES_LEN: usize = 256;

/// Logical length of the attenuation table: 12 octaves of sign-interleaved
/// entries, stored folded to a single octave.
pub const TL_TAB_LEN: usize = 12 * 2 * TL_RES_LEN;

/// Operators attenuated at or beyond this level are skipped; every lookup
/// past it lands outside the attenuation table and yields zero anyway.
pub const ENV_QUIET: u32 = (TL_TAB_LEN >> 4) as u32;

/// Steps in one envelope increment pattern
pub const RATE_STEPS: usize = 8;

/// Pattern selector used for attack rates past the table ("rate 15 2/3")
pub const ATTACK_FAST_SELECT: u8 = 13 * RATE_STEPS as u8;

/// Combined attack rate index from which attacks use [`ATTACK_FAST_SELECT`]
pub const ATTACK_FAST_RATE: u32 = 16 + 62;

/// Attenuation increments for the 8 consecutive firing instants of a rate
pub const EG_INC: [u8; 15 * RATE_STEPS] = [
    // cycle: 0 1  2 3  4 5  6 7
    0, 1, 0, 1, 0, 1, 0, 1, // 0: rates 00..12 0 (increment by 0 or 1)
    0, 1, 0, 1, 1, 1, 0, 1, // 1: rates 00..12 1
    0, 1, 1, 1, 0, 1, 1, 1, // 2: rates 00..12 2
    0, 1, 1, 1, 1, 1, 1, 1, // 3: rates 00..12 3
    1, 1, 1, 1, 1, 1, 1, 1, // 4: rate 13 0 (increment by 1)
    1, 1, 1, 2, 1, 1, 1, 2, // 5: rate 13 1
    1, 2, 1, 2, 1, 2, 1, 2, // 6: rate 13 2
    1, 2, 2, 2, 1, 2, 2, 2, // 7: rate 13 3
    2, 2, 2, 2, 2, 2, 2, 2, // 8: rate 14 0 (increment by 2)
    2, 2, 2, 4, 2, 2, 2, 4, // 9: rate 14 1
    2, 4, 2, 4, 2, 4, 2, 4, // 10: rate 14 2
    2, 4, 4, 4, 2, 4, 4, 4, // 11: rate 14 3
    4, 4, 4, 4, 4, 4, 4, 4, // 12: rates 15 0..3 (increment by 4)
    8, 8, 8, 8, 8, 8, 8, 8, // 13: rates 15 2, 15 3 for attack
    0, 0, 0, 0, 0, 0, 0, 0, // 14: infinity rates for attack and decay(s)
];

/// Offset of each increment pattern in [`EG_INC`], indexed by combined rate
/// (16 infinite rates + 64 rates + 16 key-scale overflow rates)
#[rustfmt::skip]
pub const EG_RATE_SELECT: [u8; 16 + 64 + 16] = [
    // 16 infinite time rates
    112, 112, 112, 112, 112, 112, 112, 112,
    112, 112, 112, 112, 112, 112, 112, 112,
    // rates 00-12
    0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,
    0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,
    0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,   0, 8, 16, 24,
    0, 8, 16, 24,
    // rate 13
    32, 40, 48, 56,
    // rate 14
    64, 72, 80, 88,
    // rate 15
    96, 96, 96, 96,
    // 16 dummy rates (same as 15 3)
    96, 96, 96, 96, 96, 96, 96, 96,
    96, 96, 96, 96, 96, 96, 96, 96,
];

/// Envelope counter shift per combined rate: the operator advances once
/// every `1 << shift` envelope clocks.
#[rustfmt::skip]
pub const EG_RATE_SHIFT: [u8; 16 + 64 + 16] = [
    // 16 infinite time rates
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    // rates 00-12
    12, 12, 12, 12,
    11, 11, 11, 11,
    10, 10, 10, 10,
    9, 9, 9, 9,
    8, 8, 8, 8,
    7, 7, 7, 7,
    6, 6, 6, 6,
    5, 5, 5, 5,
    4, 4, 4, 4,
    3, 3, 3, 3,
    2, 2, 2, 2,
    1, 1, 1, 1,
    0, 0, 0, 0,
    // rate 13
    0, 0, 0, 0,
    // rate 14
    0, 0, 0, 0,
    // rate 15
    0, 0, 0, 0,
    // 16 dummy rates (same as 15 3)
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
];

/// Key scale level attenuation per (block, fnum bits 9-6), 3 dB/octave in
/// envelope units. Operators shift it down to 1.5 / 3 / 6 dB per octave.
#[rustfmt::skip]
pub const KSL_TAB: [u8; 8 * 16] = [
    // OCT 0
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    // OCT 1
    0, 0, 0, 0, 0, 0, 0, 0, 0, 8, 12, 16, 20, 24, 28, 32,
    // OCT 2
    0, 0, 0, 0, 0, 12, 20, 28, 32, 40, 44, 48, 52, 56, 60, 64,
    // OCT 3
    0, 0, 0, 20, 32, 44, 52, 60, 64, 72, 76, 80, 84, 88, 92, 96,
    // OCT 4
    0, 0, 32, 52, 64, 76, 84, 92, 96, 104, 108, 112, 116, 120, 124, 128,
    // OCT 5
    0, 32, 64, 84, 96, 108, 116, 124, 128, 136, 140, 144, 148, 152, 156, 160,
    // OCT 6
    0, 64, 96, 116, 128, 140, 148, 156, 160, 168, 172, 176, 180, 184, 188, 192,
    // OCT 7
    0, 96, 128, 148, 160, 172, 180, 188, 192, 200, 204, 208, 212, 216, 220, 224,
];

/// Sustain level in envelope units: 3 dB per step, step 15 is 93 dB
pub const SL_TAB: [u32; 16] = [
    0, 16, 32, 48, 64, 80, 96, 112, 128, 144, 160, 176, 192, 208, 224, 496,
];

/// Frequency multipliers, doubled (1/2, 1, 2, 3, ... 10, 10, 12, 12, 15, 15)
pub const MUL_TAB: [u8; 16] = [1, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 20, 24, 24, 30, 30];

/// Number of entries in the tremolo waveform
pub const LFO_AM_TAB_ELEMENTS: usize = 210;

/// Tremolo waveform (verified on real YM3812)
///
/// 27 output levels of a triangle wave. Each entry is held for 64 samples,
/// so one period lasts 64 * 210 = 13440 samples. With the deep tremolo bit
/// cleared the value is divided by 4 before use.
#[rustfmt::skip]
pub const LFO_AM_TABLE: [u8; LFO_AM_TAB_ELEMENTS] = [
    0, 0, 0, 0, 0, 0, 0,
    1, 1, 1, 1,
    2, 2, 2, 2,
    3, 3, 3, 3,
    4, 4, 4, 4,
    5, 5, 5, 5,
    6, 6, 6, 6,
    7, 7, 7, 7,
    8, 8, 8, 8,
    9, 9, 9, 9,
    10, 10, 10, 10,
    11, 11, 11, 11,
    12, 12, 12, 12,
    13, 13, 13, 13,
    14, 14, 14, 14,
    15, 15, 15, 15,
    16, 16, 16, 16,
    17, 17, 17, 17,
    18, 18, 18, 18,
    19, 19, 19, 19,
    20, 20, 20, 20,
    21, 21, 21, 21,
    22, 22, 22, 22,
    23, 23, 23, 23,
    24, 24, 24, 24,
    25, 25, 25, 25,
    26, 26, 26,
    25, 25, 25, 25,
    24, 24, 24, 24,
    23, 23, 23, 23,
    22, 22, 22, 22,
    21, 21, 21, 21,
    20, 20, 20, 20,
    19, 19, 19, 19,
    18, 18, 18, 18,
    17, 17, 17, 17,
    16, 16, 16, 16,
    15, 15, 15, 15,
    14, 14, 14, 14,
    13, 13, 13, 13,
    12, 12, 12, 12,
    11, 11, 11, 11,
    10, 10, 10, 10,
    9, 9, 9, 9,
    8, 8, 8, 8,
    7, 7, 7, 7,
    6, 6, 6, 6,
    5, 5, 5, 5,
    4, 4, 4, 4,
    3, 3, 3, 3,
    2, 2, 2, 2,
    1, 1, 1, 1,
];

/// Vibrato fnum offsets (verified on real YM3812)
///
/// Layout: 8 fnum ranges (fnum bits 9-7) x 2 depths x 8 LFO phases.
#[rustfmt::skip]
pub const LFO_PM_TABLE: [i8; 8 * 8 * 2] = [
    // FNUM2/FNUM = 00 0xxxxxxx (0x0000)
    0, 0, 0, 0, 0, 0, 0, 0,     // depth 0
    0, 0, 0, 0, 0, 0, 0, 0,     // depth 1
    // FNUM2/FNUM = 00 1xxxxxxx (0x0080)
    0, 0, 0, 0, 0, 0, 0, 0,
    1, 0, 0, 0, -1, 0, 0, 0,
    // FNUM2/FNUM = 01 0xxxxxxx (0x0100)
    1, 0, 0, 0, -1, 0, 0, 0,
    2, 1, 0, -1, -2, -1, 0, 1,
    // FNUM2/FNUM = 01 1xxxxxxx (0x0180)
    1, 0, 0, 0, -1, 0, 0, 0,
    3, 1, 0, -1, -3, -1, 0, 1,
    // FNUM2/FNUM = 10 0xxxxxxx (0x0200)
    2, 1, 0, -1, -2, -1, 0, 1,
    4, 2, 0, -2, -4, -2, 0, 2,
    // FNUM2/FNUM = 10 1xxxxxxx (0x0280)
    2, 1, 0, -1, -2, -1, 0, 1,
    5, 2, 0, -2, -5, -2, 0, 2,
    // FNUM2/FNUM = 11 0xxxxxxx (0x0300)
    3, 1, 0, -1, -3, -1, 0, 1,
    6, 3, 0, -3, -6, -3, 0, 3,
    // FNUM2/FNUM = 11 1xxxxxxx (0x0380)
    3, 1, 0, -1, -3, -1, 0, 1,
    7, 3, 0, -3, -7, -3, 0, 3,
];
