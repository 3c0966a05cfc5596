//! Generated Operator Tables
//!
//! The logarithmic sine table and the attenuation-to-linear table are built
//! once per process and shared by every chip instance. Both are stored in
//! their folded form: the attenuation table covers a single octave (the
//! remaining octaves are plain right shifts) and the four waveforms are
//! derived from the sine table at lookup time.

use std::f64::consts::PI;
use std::sync::OnceLock;

use super::constants::{ENV_STEP, SIN_BITS, SIN_LEN, SIN_MASK, TL_RES_LEN, TL_TAB_LEN};

/// Operator waveform (register 0xE0-0xF5, bits 0-1)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Full sine
    #[default]
    Sine = 0,
    /// Positive half only, negative half silent
    HalfSine = 1,
    /// Absolute value of the sine
    AbsSine = 2,
    /// First quarter of every half period, rest silent
    QuarterSine = 3,
}

impl Waveform {
    /// Decode the two waveform bits of a register value
    pub fn from_register(value: u8) -> Self {
        match value & 0x03 {
            0 => Waveform::Sine,
            1 => Waveform::HalfSine,
            2 => Waveform::AbsSine,
            _ => Waveform::QuarterSine,
        }
    }

    /// Sine table entry for a phase index, `None` when the waveform is silent there
    #[inline]
    fn shape(self, index: usize) -> Option<usize> {
        match self {
            Waveform::Sine => Some(index),
            Waveform::HalfSine => {
                if index & (1 << (SIN_BITS - 1)) != 0 {
                    None
                } else {
                    Some(index)
                }
            }
            Waveform::AbsSine => Some(index & (SIN_MASK >> 1)),
            Waveform::QuarterSine => {
                if index & (1 << (SIN_BITS - 2)) != 0 {
                    None
                } else {
                    Some(index & (SIN_MASK >> 2))
                }
            }
        }
    }
}

/// Process-wide operator lookup tables
pub struct Tables {
    /// Linear amplitude of one octave of attenuation steps (12 bit, unsigned)
    tl: [i16; TL_RES_LEN],
    /// Sine in attenuation units, bit 0 carries the sign
    sin: [u16; SIN_LEN],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Shared tables, built on first use
#[inline]
pub fn tables() -> &'static Tables {
    TABLES.get_or_init(Tables::build)
}

/// Round a fixed-point value with one fractional bit to the nearest integer
#[inline]
fn round_half(n: i32) -> i32 {
    if n & 1 != 0 {
        (n >> 1) + 1
    } else {
        n >> 1
    }
}

impl Tables {
    fn build() -> Self {
        let mut tl = [0i16; TL_RES_LEN];
        for (x, entry) in tl.iter_mut().enumerate() {
            let m = (65536.0 / 2f64.powf((x + 1) as f64 * (ENV_STEP / 4.0) / 8.0)).floor();
            // 16 bits here, keep 12 and round to 11
            let n = round_half((m as i32) >> 4);
            *entry = (n << 1) as i16;
        }

        let mut sin = [0u16; SIN_LEN];
        for (i, entry) in sin.iter_mut().enumerate() {
            // never reaches zero thanks to the half-step offset
            let m = (((i * 2) + 1) as f64 * PI / SIN_LEN as f64).sin();
            let o = 8.0 * (1.0 / m.abs()).log2() / (ENV_STEP / 4.0);
            let n = round_half((2.0 * o) as i32);
            *entry = (n * 2 + if m >= 0.0 { 0 } else { 1 }) as u16;
        }

        Self { tl, sin }
    }

    /// Raw sine table entry (attenuation with sign in bit 0)
    #[inline]
    pub fn sin_entry(&self, index: usize) -> u16 {
        self.sin[index & SIN_MASK]
    }

    /// Linear amplitude for an interleaved attenuation index
    ///
    /// Bit 0 of `p` is the sign, bits 1-8 address the octave table and the
    /// remaining bits select the octave shift. Indices past the logical
    /// table length are silent.
    #[inline]
    pub fn attenuation_to_linear(&self, p: u32) -> i32 {
        if p as usize >= TL_TAB_LEN {
            return 0;
        }
        let negative = p & 1 != 0;
        let p = p >> 1;
        let out = (self.tl[(p & 0xff) as usize] as i32) >> (p >> 8);
        if negative {
            -out
        } else {
            out
        }
    }

    /// Operator output for a 10-bit phase index and total attenuation
    #[inline]
    pub fn lookup(&self, waveform: Waveform, index: usize, env: u32) -> i32 {
        match waveform.shape(index & SIN_MASK) {
            Some(i) => self.attenuation_to_linear(self.sin[i] as u32 + (env << 4)),
            None => 0,
        }
    }
}
