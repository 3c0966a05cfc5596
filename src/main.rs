//! Command-line renderer for YM3812 register logs
//!
//! Renders DRO / IMF captures (or a built-in demo patch) to WAV, optionally
//! tracing every sample and channel tap to CSV.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use simplelog::{Config, SimpleLogger};

use ym3812::reglog::{load_log_with, ImfParser, RegisterLog};
use ym3812::replayer::LogPlayer;
use ym3812::ym3812::NUM_CHANNELS;
use ym3812::{write_wav, ChipConfig, ExportConfig, Ym3812};

/// Block 4 fnums for C4..C5
const DEMO_SCALE: [u16; 8] = [0x159, 0x181, 0x1b0, 0x1ca, 0x202, 0x241, 0x287, 0x2b2];

/// Demo tempo: one beat every 250 ms
const BEAT_MS: u32 = 250;

#[derive(Parser)]
#[command(name = "ym3812")]
#[command(about = "Render YM3812 (OPL2) register logs to WAV")]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a DRO or IMF register log
    Render {
        /// Input register log
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON chip configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Chip clock in Hz (overrides the config file)
        #[arg(long)]
        clock: Option<u32>,

        /// Output sample rate in Hz (overrides the config file)
        #[arg(long)]
        rate: Option<u32>,

        /// Tick rate for IMF files
        #[arg(long, default_value_t = 700)]
        imf_rate: u32,

        /// Write a stereo WAV
        #[arg(long)]
        stereo: bool,

        /// Write a per-sample CSV trace (output and channel taps)
        #[arg(long)]
        trace: Option<PathBuf>,
    },
    /// Render the built-in demo patch
    Demo {
        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Length in seconds
        #[arg(long, default_value_t = 4)]
        seconds: u32,

        /// Add a rhythm-mode drum pattern
        #[arg(long)]
        rhythm: bool,

        /// Write a stereo WAV
        #[arg(long)]
        stereo: bool,
    },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    SimpleLogger::init(log_level(verbose), Config::default()).context("Failed to install logger")
}

fn chip_config(path: Option<&Path>, clock: Option<u32>, rate: Option<u32>) -> anyhow::Result<ChipConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config '{}'", path.display()))?;
            ChipConfig::from_json(&text)?
        }
        None => ChipConfig::default(),
    };
    if let Some(clock) = clock {
        config.clock_hz = clock;
    }
    if let Some(rate) = rate {
        config.sample_rate = rate;
    }
    Ok(config)
}

fn export_config(stereo: bool) -> ExportConfig {
    if stereo {
        ExportConfig::stereo()
    } else {
        ExportConfig::mono()
    }
}

/// Render sample by sample, writing one CSV row per sample
fn render_traced(player: &mut LogPlayer, trace: &Path) -> anyhow::Result<Vec<i16>> {
    let mut writer =
        csv::Writer::from_path(trace).with_context(|| format!("Failed to create trace '{}'", trace.display()))?;

    let mut header = vec!["sample".to_string(), "output".to_string()];
    header.extend((0..NUM_CHANNELS).map(|ch| format!("ch{ch}")));
    writer.write_record(&header)?;

    let mut samples = Vec::with_capacity(player.remaining_samples() as usize);
    while !player.is_finished() {
        for sample in player.render(1) {
            let mut row = vec![samples.len().to_string(), sample.to_string()];
            row.extend(player.chip().channel_outputs().iter().map(|tap| tap.to_string()));
            writer.write_record(&row)?;
            samples.push(sample);
        }
    }
    writer.flush()?;
    info!("Trace written to {}", trace.display());
    Ok(samples)
}

/// Two-operator lead on channels 0-2, optional drums on 6-8
fn demo_log(seconds: u32, rhythm: bool) -> RegisterLog {
    let mut log = RegisterLog::new(1000);

    // wave select on, lead patch: modulator with feedback, percussive carrier
    log.push_write(0x01, 0x20);
    for (modulator, carrier, ch) in [(0x00u8, 0x03u8, 0u8), (0x01, 0x04, 1), (0x02, 0x05, 2)] {
        log.push_write(0x20 + modulator, 0x01);
        log.push_write(0x40 + modulator, 0x18);
        log.push_write(0x60 + modulator, 0xf3);
        log.push_write(0x80 + modulator, 0x35);
        log.push_write(0x20 + carrier, 0x01);
        log.push_write(0x40 + carrier, 0x00);
        log.push_write(0x60 + carrier, 0xf4);
        log.push_write(0x80 + carrier, 0x56);
        log.push_write(0xe0 + carrier, 0x01);
        log.push_write(0xc0 + ch, 0x06);
    }

    if rhythm {
        // bass drum (ch6), hi-hat/snare (ch7), tom/cymbal (ch8)
        for (offset, value) in [(0x10u8, 0x01u8), (0x13, 0x01), (0x11, 0x01), (0x14, 0x01), (0x12, 0x02), (0x15, 0x01)] {
            log.push_write(0x20 + offset, value);
            log.push_write(0x40 + offset, 0x00);
            log.push_write(0x60 + offset, 0xf8);
            log.push_write(0x80 + offset, 0x0a);
        }
        for (ch, fnum) in [(6u8, 0x0c0u16), (7, 0x1b0), (8, 0x2e0)] {
            log.push_write(0xa0 + ch, (fnum & 0xff) as u8);
            log.push_write(0xb0 + ch, (2 << 2) | (fnum >> 8) as u8);
        }
        log.push_write(0xbd, 0x20);
    }

    let beats = seconds * 1000 / BEAT_MS;
    for beat in 0..beats {
        let ch = (beat % 3) as u8;
        let fnum = DEMO_SCALE[beat as usize % DEMO_SCALE.len()];
        log.push_write(0xa0 + ch, (fnum & 0xff) as u8);
        log.push_write(0xb0 + ch, 0x20 | (4 << 2) | (fnum >> 8) as u8);
        if rhythm {
            let drums = if beat % 2 == 0 { 0x10 } else { 0x08 };
            log.push_write(0xbd, 0x20 | drums | 0x01);
        }
        log.push_delay(BEAT_MS * 4 / 5);
        log.push_write(0xb0 + ch, (4 << 2) | (fnum >> 8) as u8);
        if rhythm {
            log.push_write(0xbd, 0x20);
        }
        log.push_delay(BEAT_MS / 5);
    }
    log
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Render {
            input,
            output,
            config,
            clock,
            rate,
            imf_rate,
            stereo,
            trace,
        } => {
            if imf_rate == 0 {
                bail!("--imf-rate must be non-zero");
            }
            let config = chip_config(config.as_deref(), clock, rate)?;
            let sample_rate = config.sample_rate;
            let log = load_log_with(&input, ImfParser::new(imf_rate))
                .with_context(|| format!("Failed to load '{}'", input.display()))?;
            let chip = Ym3812::new(config).context("Failed to create chip")?;
            let mut player = LogPlayer::new(chip, log);

            let samples = match trace {
                Some(trace) => render_traced(&mut player, &trace)?,
                None => player.render_to_end(),
            };
            write_wav(&output, &samples, sample_rate, export_config(stereo))?;
            info!(
                "Wrote {} ({:.2}s)",
                output.display(),
                samples.len() as f64 / sample_rate as f64
            );
        }
        Command::Demo {
            output,
            seconds,
            rhythm,
            stereo,
        } => {
            let chip = Ym3812::new(ChipConfig::default())?;
            let sample_rate = chip.config().sample_rate;
            let mut player = LogPlayer::new(chip, demo_log(seconds, rhythm));
            let samples = player.render_to_end();
            write_wav(&output, &samples, sample_rate, export_config(stereo))?;
            info!("Wrote demo to {}", output.display());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    run(args)
}
