//! File-based equalizer processing command.

use super::common::SettingsArgs;
use crate::wav::{WavSpec, read_wav_channels, write_wav_channels};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use peq_core::linear_to_db;
use peq_engine::{ChainSettings, EngineConfig, EqualizerEngine};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    if !matches!(args.bit_depth, 16 | 24 | 32) {
        anyhow::bail!("Bit depth must be 16, 24 or 32, got {}", args.bit_depth);
    }

    let settings = args.settings.settings()?;
    let config = args.settings.engine_config()?;

    println!("Reading {}...", args.input.display());
    let (mut channels, spec) = read_wav_channels(&args.input)?;
    let frames = channels.first().map_or(0, Vec::len);

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        spec.channels,
        spec.sample_rate,
        frames as f64 / spec.sample_rate as f64
    );

    let input_stats = Stats::measure(&channels);

    println!("Processing...");
    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    process_buffers(&mut channels, spec.sample_rate as f32, &settings, config, args.block_size, |done| {
        pb.set_position(done as u64);
    });

    pb.finish_with_message("done");

    let output_stats = Stats::measure(&channels);
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(input_stats.rms),
        linear_to_db(input_stats.peak)
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(output_stats.rms),
        linear_to_db(output_stats.peak)
    );

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav_channels(&args.output, &channels, out_spec)?;
    println!("Done!");

    Ok(())
}

/// Run `channels` through a freshly prepared engine in `block_size` chunks.
///
/// `progress` receives the number of frames processed after each block.
pub fn process_buffers(
    channels: &mut [Vec<f32>],
    sample_rate: f32,
    settings: &ChainSettings,
    config: EngineConfig,
    block_size: usize,
    mut progress: impl FnMut(usize),
) {
    let frames = channels.first().map_or(0, Vec::len);
    let mut engine = EqualizerEngine::with_config(config);
    engine.prepare(sample_rate, block_size, channels.len());
    engine.update_coefficients(*settings);

    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let mut block: Vec<&mut [f32]> = channels.iter_mut().map(|c| &mut c[start..end]).collect();
        engine.process_block(&mut block);
        start = end;
        progress(start);
    }

    tracing::debug!(frames, channels = channels.len(), "file processed");
}

struct Stats {
    rms: f32,
    peak: f32,
}

impl Stats {
    fn measure(channels: &[Vec<f32>]) -> Self {
        let count: usize = channels.iter().map(Vec::len).sum();
        if count == 0 {
            return Self { rms: 0.0, peak: 0.0 };
        }
        let sum_sq: f64 = channels
            .iter()
            .flatten()
            .map(|&s| s as f64 * s as f64)
            .sum();
        let peak = channels
            .iter()
            .flatten()
            .fold(0.0f32, |acc, &s| acc.max(s.abs()));
        Self {
            rms: (sum_sq / count as f64).sqrt() as f32,
            peak,
        }
    }
}
