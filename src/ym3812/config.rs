//! Chip configuration and derived clock rates

use log::debug;
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::constants::{EG_SH, FREQ_SH, LFO_AM_TAB_ELEMENTS, LFO_SH};
use super::operator::FnumTable;
use crate::{Result, Ym3812Error};

/// NTSC colour burst crystal used by AdLib-style boards (3.579545 MHz)
pub const DEFAULT_CLOCK: u32 = 3_579_545;

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Chip family member
///
/// Both share the synthesis core; they differ only in whether the
/// wave-select enable bit of register 0x01 exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive)]
pub enum ChipVariant {
    /// OPL: sine waveform only
    Ym3526 = 0,
    /// OPL2: four waveforms behind the wave-select enable bit
    #[default]
    Ym3812 = 1,
}

impl ChipVariant {
    /// Register 0x01 bit 5 is honoured
    pub fn supports_wave_select(self) -> bool {
        matches!(self, ChipVariant::Ym3812)
    }
}

/// Chip construction parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Input clock in Hz
    pub clock_hz: u32,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Chip variant
    pub variant: ChipVariant,
    /// Saturate the mix to 16 bits instead of wrapping
    pub clamp_output: bool,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK,
            sample_rate: DEFAULT_SAMPLE_RATE,
            variant: ChipVariant::Ym3812,
            clamp_output: true,
        }
    }
}

impl ChipConfig {
    /// Default configuration with custom clocks
    pub fn with_clocks(clock_hz: u32, sample_rate: u32) -> Self {
        Self {
            clock_hz,
            sample_rate,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Ym3812Error::ConfigError(format!("invalid chip config: {e}")))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Ym3812Error::ConfigError(e.to_string()))
    }
}

/// Per-sample increments derived from the clock / sample rate ratio
#[derive(Clone, Debug, PartialEq)]
pub struct ClockRates {
    /// Native chip samples (clock / 72) per output sample
    pub freqbase: f64,
    /// Fnum to phase increment table
    pub fn_tab: FnumTable,
    /// Tremolo counter increment (8.24)
    pub lfo_am_inc: u32,
    /// Vibrato counter increment (8.24)
    pub lfo_pm_inc: u32,
    /// Noise shifts per sample (16.16)
    pub noise_f: u32,
    /// Envelope timer increment (16.16)
    pub eg_timer_add: u32,
}

/// Largest multiplier a phase increment is scaled by
const MAX_MUL: f64 = 30.0;

fn fit_u32(value: f64, limit: u32, what: &str) -> Result<u32> {
    if value.is_finite() && value >= 0.0 && value <= limit as f64 {
        Ok(value as u32)
    } else {
        Err(Ym3812Error::ConfigError(format!(
            "{what} increment {value:.0} does not fit 32 bits; clock/sample rate ratio too large"
        )))
    }
}

impl ClockRates {
    /// Derive every increment, rejecting ratios that overflow the accumulators
    pub fn new(config: &ChipConfig) -> Result<Self> {
        if config.clock_hz == 0 {
            return Err(Ym3812Error::ConfigError("clock must be non-zero".into()));
        }
        if config.sample_rate == 0 {
            return Err(Ym3812Error::ConfigError("sample rate must be non-zero".into()));
        }

        let freqbase = (config.clock_hz as f64 / 72.0) / config.sample_rate as f64;

        // accumulators hold at most one period (or one unit) before the add
        let am_headroom = u32::MAX - ((LFO_AM_TAB_ELEMENTS as u32) << LFO_SH);
        let unit_headroom = u32::MAX - ((1u32 << FREQ_SH) - 1);

        let top = 1023.0 * 64.0 * freqbase * (1u32 << (FREQ_SH - 10)) as f64;
        fit_u32(top * MAX_MUL, u32::MAX, "phase")?;

        let mut fn_tab = [0u32; 1024];
        for (i, entry) in fn_tab.iter_mut().enumerate() {
            // the chip works in 10.10 fixed point, we use 16.16
            *entry = (i as f64 * 64.0 * freqbase * (1u32 << (FREQ_SH - 10)) as f64) as u32;
        }

        let rates = Self {
            freqbase,
            fn_tab,
            // one tremolo entry lasts 64 samples
            lfo_am_inc: fit_u32((1.0 / 64.0) * (1u32 << LFO_SH) as f64 * freqbase, am_headroom, "tremolo")?,
            // one vibrato step lasts 1024 samples
            lfo_pm_inc: fit_u32((1.0 / 1024.0) * (1u32 << LFO_SH) as f64 * freqbase, u32::MAX, "vibrato")?,
            noise_f: fit_u32((1u32 << FREQ_SH) as f64 * freqbase, unit_headroom, "noise")?,
            eg_timer_add: fit_u32((1u32 << EG_SH) as f64 * freqbase, unit_headroom, "envelope")?,
        };
        debug!(
            "YM3812 clocks: {} Hz / {} Hz, freqbase {:.6}, eg_timer_add {}, noise_f {}, lfo_am_inc {}, lfo_pm_inc {}",
            config.clock_hz,
            config.sample_rate,
            rates.freqbase,
            rates.eg_timer_add,
            rates.noise_f,
            rates.lfo_am_inc,
            rates.lfo_pm_inc
        );
        Ok(rates)
    }
}
