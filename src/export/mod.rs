//! Audio Export
//!
//! Writes rendered chip output to WAV files.

pub mod wav;

pub use wav::{export_log_to_wav, write_wav};

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportConfig {
    /// 1 (mono) or 2 (stereo, duplicated mono)
    pub channels: u16,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { channels: 1 }
    }
}

impl ExportConfig {
    /// Mono output
    pub fn mono() -> Self {
        Self { channels: 1 }
    }

    /// Stereo output with both sides identical
    pub fn stereo() -> Self {
        Self { channels: 2 }
    }
}
