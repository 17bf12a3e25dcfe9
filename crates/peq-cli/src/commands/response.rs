//! Magnitude response command.

use super::common::SettingsArgs;
use clap::Args;
use peq_engine::{ChainCoefficients, ChainSettings, EngineConfig, log_frequencies};
use serde::Serialize;

#[derive(Args)]
pub struct ResponseArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Sample rate the filters are designed for
    #[arg(long, default_value = "48000")]
    sample_rate: f32,

    /// Number of log-spaced frequency points
    #[arg(long, default_value = "31")]
    points: usize,

    /// Lowest frequency to evaluate
    #[arg(long, default_value = "20")]
    min_freq: f32,

    /// Highest frequency to evaluate (capped at Nyquist)
    #[arg(long, default_value = "20000")]
    max_freq: f32,

    /// Print as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// A response curve as printed by `peq response --json`.
#[derive(Debug, Serialize)]
pub struct ResponseReport {
    pub sample_rate: f32,
    pub settings: ChainSettings,
    pub config: EngineConfig,
    pub stable: bool,
    pub points: Vec<ResponsePoint>,
}

/// Magnitude at one frequency.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResponsePoint {
    pub frequency_hz: f32,
    pub magnitude_db: f32,
}

/// Evaluate the response of `settings` over a log-spaced frequency grid.
pub fn compute(
    settings: &ChainSettings,
    config: &EngineConfig,
    sample_rate: f32,
    points: usize,
    min_freq: f32,
    max_freq: f32,
) -> anyhow::Result<ResponseReport> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        anyhow::bail!("Sample rate must be positive, got {}", sample_rate);
    }
    let max_freq = max_freq.min(sample_rate / 2.0);
    if !(min_freq > 0.0 && min_freq < max_freq) {
        anyhow::bail!(
            "Frequency range must satisfy 0 < min < max <= Nyquist, got {} .. {}",
            min_freq,
            max_freq
        );
    }

    let settings = settings.clamped();
    let coeffs = ChainCoefficients::design(&settings, config, sample_rate);
    let points = log_frequencies(points, min_freq, max_freq)
        .into_iter()
        .map(|frequency_hz| ResponsePoint {
            frequency_hz,
            magnitude_db: coeffs.magnitude_db(frequency_hz),
        })
        .collect();

    Ok(ResponseReport {
        sample_rate,
        settings,
        config: config.clone(),
        stable: coeffs.is_stable(),
        points,
    })
}

pub fn run(args: ResponseArgs) -> anyhow::Result<()> {
    let settings = args.settings.settings()?;
    let config = args.settings.engine_config()?;
    let report = compute(
        &settings,
        &config,
        args.sample_rate,
        args.points,
        args.min_freq,
        args.max_freq,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Magnitude response at {} Hz (HP {}, LP {})",
        report.sample_rate, config.hp_slope, config.lp_slope
    );
    println!();
    println!("  {:>10}  {:>9}", "Freq (Hz)", "Gain (dB)");
    println!("  {:>10}  {:>9}", "---------", "---------");
    for point in &report.points {
        println!(
            "  {:>10.1}  {:>+9.2}  {}",
            point.frequency_hz,
            point.magnitude_db,
            bar(point.magnitude_db)
        );
    }

    Ok(())
}

/// Text bar centered on 0 dB, one character per 1.5 dB, 12 characters each side.
fn bar(db: f32) -> String {
    let cells = (db / 1.5).round().clamp(-12.0, 12.0) as i32;
    let left = (-cells).max(0) as usize;
    let right = cells.max(0) as usize;
    format!(
        "{}{}|{}",
        " ".repeat(12 - left),
        "-".repeat(left),
        "+".repeat(right)
    )
}
