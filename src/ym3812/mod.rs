//! YM3812 (OPL2) FM synthesis core
//!
//! Sample-accurate model of the Yamaha YM3812 and its YM3526 predecessor:
//! nine channels of two operators each, four-state envelope generators,
//! tremolo/vibrato LFOs, a noise generator and the five-voice rhythm mode.
//!
//! # Signal path
//!
//! ```text
//!   register write ──► Register::from_addr ──► Channel / Operator params
//!
//!   per sample:
//!     LFO ──► AM / PM
//!     ch0..ch5 ─────────────────────────────┐
//!     ch6..ch8 ─┬─ melodic ─────────────────┼─► Σ ─► clamp/wrap ─► i16
//!               └─ rhythm (BD,HH,SD,TT,CY) ─┘
//!     envelope clock ─► phase generators ─► noise
//! ```
//!
//! Each [`Ym3812`] owns all of its state; only the sine and attenuation
//! tables are shared, built once on first use.

pub mod channel;
pub mod chip;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod generators;
pub mod operator;
pub mod registers;
pub mod rhythm;
pub mod status;
pub mod tables;
pub mod timer;

pub use channel::{Channel, Connection, CARRIER, MODULATOR};
pub use chip::{Samples, Ym3812};
pub use config::{ChipConfig, ChipVariant, ClockRates, DEFAULT_CLOCK, DEFAULT_SAMPLE_RATE};
pub use envelope::{Envelope, EnvelopeState};
pub use operator::{KeySource, Operator};
pub use registers::{Register, SlotId, NUM_CHANNELS, NUM_SLOTS};
pub use rhythm::RhythmVoice;
pub use status::{StatusFlags, StatusRegister};
pub use tables::Waveform;
pub use timer::{NullTimerSink, Timer, TimerSink, Timers};
