//! WAV file export functionality

use super::ExportConfig;
use crate::replayer::LogPlayer;
use crate::{Result, Ym3812Error};
use log::info;
use std::path::Path;

/// Write 16-bit PCM samples to a WAV file
///
/// Stereo duplicates each mono sample to both sides.
///
/// # Arguments
///
/// * `path` - Path where the WAV file will be written
/// * `samples` - Mono chip output
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Channel layout
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32, config: ExportConfig) -> Result<()> {
    if !(1..=2).contains(&config.channels) {
        return Err(Ym3812Error::ConfigError(format!(
            "WAV export supports 1 or 2 channels, got {}",
            config.channels
        )));
    }

    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let audio_err = |e: hound::Error| Ym3812Error::AudioFileError(e.to_string());
    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .map_err(|e| Ym3812Error::AudioFileError(format!("Failed to create WAV file: {e}")))?;

    for &sample in samples {
        for _ in 0..config.channels {
            writer.write_sample(sample).map_err(audio_err)?;
        }
    }
    writer.finalize().map_err(audio_err)?;
    Ok(())
}

/// Render a register log to its end and write it to a WAV file
///
/// # Examples
///
/// ```no_run
/// use ym3812::{export_log_to_wav, load_log, ExportConfig, LogPlayer, Ym3812};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let log = load_log("capture.dro")?;
/// let mut player = LogPlayer::new(Ym3812::with_clocks(3_579_545, 44_100)?, log);
/// export_log_to_wav(&mut player, "capture.wav", ExportConfig::stereo())?;
/// # Ok(())
/// # }
/// ```
pub fn export_log_to_wav<P: AsRef<Path>>(player: &mut LogPlayer, path: P, config: ExportConfig) -> Result<usize> {
    let sample_rate = player.chip().config().sample_rate;
    info!(
        "Rendering {:.1}s of register log...",
        player.remaining_samples() as f64 / sample_rate as f64
    );
    let samples = player.render_to_end();

    info!("Writing WAV file to {}...", path.as_ref().display());
    write_wav(path, &samples, sample_rate, config)?;
    Ok(samples.len())
}
