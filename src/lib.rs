//! YM3812 (OPL2) FM Synthesis Emulator
//!
//! A sample-accurate emulator of the Yamaha YM3812 FM operator chip (and its
//! YM3526 predecessor) as found on AdLib and Sound Blaster cards. Supports
//! the full register set, rhythm mode, CSM key control, timers, and replay of
//! captured register logs.
//!
//! # Features
//! - Nine two-operator channels with KSR/KSL, tremolo and vibrato
//! - Four waveforms behind the wave-select enable bit
//! - Five-voice rhythm mode driven by the noise generator
//! - Status register, IRQ mask and host-scheduled timers
//! - DOSBox DRO v2 and id Software IMF register-log playback
//! - WAV export and a command-line renderer
//!
//! # Crate feature flags
//! - `emulator` (default): Core YM3812 emulator (`ym3812`)
//! - `reglog` (default): DRO / IMF register-log parsing (`reglog`)
//! - `replayer` (default): Register-log player and timer scheduling (`replayer`)
//! - `export-wav` (default): WAV file export (`export`, enables `hound`)
//! - `cli` (default): `ym3812` binary (enables `clap` and `simplelog`)
//!
//! # Quick start
//! ## Core emulator only
//! ```no_run
//! use ym3812::Ym3812;
//! let mut chip = Ym3812::with_clocks(3_579_545, 44_100).unwrap();
//! chip.write(0, 0x20); // select AM/VIB/EG/KSR/MUL, channel 0 operator 1
//! chip.write(1, 0x01);
//! chip.write(0, 0xb0); // key on, block 4
//! chip.write(1, 0x32);
//! let sample = chip.next_sample();
//! ```
//!
//! ## Play a register log
//! ```no_run
//! # #[cfg(feature = "replayer")]
//! # {
//! use ym3812::{load_log, LogPlayer, Ym3812};
//! let log = load_log("capture.dro").unwrap();
//! let chip = Ym3812::with_clocks(3_579_545, 44_100).unwrap();
//! let mut player = LogPlayer::new(chip, log);
//! let audio = player.render_to_end();
//! # }
//! ```

#![warn(missing_docs)]

// Domain modules (feature-gated for modular use)
pub mod ym3812; // YM3812 FM Emulation (core)

#[cfg(feature = "export-wav")]
pub mod export; // WAV Export
#[cfg(feature = "reglog")]
pub mod reglog; // Register Log Parsing
#[cfg(feature = "replayer")]
pub mod replayer; // Playback Engine

/// Error types for YM3812 emulator operations
#[derive(thiserror::Error, Debug)]
pub enum Ym3812Error {
    /// Error while parsing a register log
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Ym3812Error {
    /// Converts a String into `Ym3812Error::Other`.
    ///
    /// Prefer the specific variants (`ParseError`, `ConfigError`,
    /// `AudioFileError`) where the failure kind is known.
    fn from(msg: String) -> Self {
        Ym3812Error::Other(msg)
    }
}

impl From<&str> for Ym3812Error {
    /// Converts a string slice into `Ym3812Error::Other`.
    fn from(msg: &str) -> Self {
        Ym3812Error::Other(msg.to_string())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Ym3812Error>;

// Public API exports
pub use ym3812::{ChipConfig, ChipVariant, Timer, TimerSink, Ym3812};

#[cfg(feature = "export-wav")]
pub use export::{export_log_to_wav, write_wav, ExportConfig};
#[cfg(feature = "reglog")]
pub use reglog::{load_log, DroParser, FormatParser, ImfParser, LogEvent, RegisterLog};
#[cfg(feature = "replayer")]
pub use replayer::{LogPlayer, SampleClock, TimerScheduler};
