//! End-to-end behavior of the equalizer engine.
//!
//! Signal-level checks: pass-through at flat settings, measured band gain,
//! click-free gain sweeps, isolation between bands, reset behavior and
//! settings hand-off from another thread.

use std::thread;

use peq_engine::{
    ChainSettings, EngineConfig, EngineState, EqParam, EqualizerEngine, Slope,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 512;
const TAU: f32 = core::f32::consts::TAU;

/// Generate a sine wave buffer.
fn sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

/// Deterministic white noise in [-0.5, 0.5).
fn noise(seed: u32, num_samples: usize) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..num_samples)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) - 0.5
        })
        .collect()
}

fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

/// Runs a mono signal through channel 0 in `BLOCK`-sized pieces.
fn process_mono(engine: &mut EqualizerEngine, signal: &mut [f32]) {
    for block in signal.chunks_mut(BLOCK) {
        engine.process(0, block);
    }
}

fn max_step(signal: &[f32]) -> f32 {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}

fn extreme_settings() -> ChainSettings {
    ChainSettings::default()
        .with(EqParam::HiFreq, 16000.0)
        .with(EqParam::HiGain, 24.0)
        .with(EqParam::HiMidFreq, 8000.0)
        .with(EqParam::HiMidGain, -24.0)
        .with(EqParam::LoMidFreq, 200.0)
        .with(EqParam::LoMidGain, 24.0)
        .with(EqParam::LowFreq, 40.0)
        .with(EqParam::LowGain, 24.0)
        .with(EqParam::HpFreq, 30.0)
        .with(EqParam::LpFreq, 18000.0)
}

// ============================================================================
// Stability
// ============================================================================

#[test]
fn impulse_response_is_bounded_and_decays() {
    for slope in Slope::ALL {
        let config = EngineConfig {
            hp_slope: slope,
            lp_slope: slope,
            ..EngineConfig::default()
        };
        let mut engine = EqualizerEngine::with_config(config);
        engine.prepare(SAMPLE_RATE, BLOCK, 1);
        engine.update_coefficients(extreme_settings());
        assert!(engine.chain(0).expect("chain").coefficients().is_stable());

        let mut signal = vec![0.0; 2 * SAMPLE_RATE as usize];
        signal[0] = 1.0;
        process_mono(&mut engine, &mut signal);

        assert!(signal.iter().all(|s| s.is_finite()), "{slope}: non-finite output");
        let peak = signal.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = signal[signal.len() - 100..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < peak * 1e-2, "{slope}: tail {tail} vs peak {peak}");
    }
}

#[test]
fn stable_at_common_sample_rates() {
    for sr in [22050.0, 44100.0, 48000.0, 88200.0, 96000.0, 192000.0] {
        let mut engine = EqualizerEngine::new();
        engine.prepare(sr, BLOCK, 1);
        engine.update_coefficients(extreme_settings().with(EqParam::LpFreq, 19000.0));
        assert!(engine.target_coefficients().is_stable(), "unstable at {sr} Hz");

        let mut signal = noise(7, 8192);
        process_mono(&mut engine, &mut signal);
        assert!(signal.iter().all(|s| s.is_finite()), "non-finite at {sr} Hz");
    }
}

// ============================================================================
// Identity, reset, isolation
// ============================================================================

#[test]
fn flat_settings_pass_audio_unchanged() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 2);
    engine.update_coefficients(ChainSettings::default());

    let input_l = noise(1, 4096);
    let input_r = noise(2, 4096);
    let mut left = input_l.clone();
    let mut right = input_r.clone();
    for (l, r) in left.chunks_mut(BLOCK).zip(right.chunks_mut(BLOCK)) {
        engine.process(0, l);
        engine.process(1, r);
    }
    assert_eq!(left, input_l);
    assert_eq!(right, input_r);
}

#[test]
fn silence_after_reset() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 1);
    engine.update_coefficients(extreme_settings());

    let mut loud = noise(3, 4096);
    process_mono(&mut engine, &mut loud);
    assert_eq!(engine.state(), EngineState::Processing);

    engine.reset();
    assert_eq!(engine.state(), EngineState::Prepared);
    assert!(engine.chain(0).expect("chain").is_silent());

    let mut quiet = vec![0.0; 4096];
    process_mono(&mut engine, &mut quiet);
    assert!(quiet.iter().all(|&s| s == 0.0));
}

#[test]
fn moving_one_band_leaves_other_regions_unchanged() {
    let base = ChainSettings::default()
        .with(EqParam::LowFreq, 100.0)
        .with(EqParam::LowGain, 6.0)
        .with(EqParam::HiMidFreq, 2000.0)
        .with(EqParam::HiMidGain, 6.0);
    let moved = base.with(EqParam::HiMidFreq, 4000.0);

    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 1);
    engine.update_coefficients(base);
    let before = engine.target_coefficients();
    engine.update_coefficients(moved);
    let after = engine.target_coefficients();

    // Stages of untouched bands are bit-identical
    assert_eq!(before.bands[0], after.bands[0]);
    assert_eq!(before.high_pass, after.high_pass);
    assert_eq!(before.low_pass, after.low_pass);

    for freq in [30.0, 60.0, 100.0, 150.0] {
        let diff = before.magnitude_db(freq) - after.magnitude_db(freq);
        assert!(diff.abs() < 0.1, "{freq} Hz moved by {diff:.3} dB");
    }
    // The moved band itself does change its region
    assert!((before.magnitude_db(2000.0) - after.magnitude_db(2000.0)).abs() > 1.0);
}

#[test]
fn channels_are_independent() {
    let settings = extreme_settings();
    let mut stereo = EqualizerEngine::new();
    stereo.prepare(SAMPLE_RATE, BLOCK, 2);
    stereo.update_coefficients(settings);
    let mut mono = EqualizerEngine::new();
    mono.prepare(SAMPLE_RATE, BLOCK, 1);
    mono.update_coefficients(settings);

    let mut left = noise(11, 4096);
    let mut right = noise(12, 4096);
    let mut reference = right.clone();
    for (l, r) in left.chunks_mut(BLOCK).zip(right.chunks_mut(BLOCK)) {
        stereo.process(0, l);
        stereo.process(1, r);
    }
    // Channel 1 behaves as if channel 0 did not exist
    process_mono(&mut mono, &mut reference);
    assert_eq!(right, reference);
}

#[test]
fn process_block_matches_per_channel_calls() {
    let settings = extreme_settings();
    let mut a = EqualizerEngine::new();
    let mut b = EqualizerEngine::new();
    for engine in [&mut a, &mut b] {
        engine.prepare(SAMPLE_RATE, BLOCK, 2);
        engine.update_coefficients(settings);
    }

    let mut l1 = noise(5, BLOCK);
    let mut r1 = noise(6, BLOCK);
    let mut l2 = l1.clone();
    let mut r2 = r1.clone();

    a.process(0, &mut l1);
    a.process(1, &mut r1);
    b.process_block(&mut [&mut l2[..], &mut r2[..]]);
    assert_eq!(l1, l2);
    assert_eq!(r1, r2);
}

// ============================================================================
// Gain accuracy and click-free transitions
// ============================================================================

#[test]
fn hi_band_boost_measures_six_db() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 2);
    engine.update_coefficients(
        ChainSettings::default()
            .with(EqParam::HiFreq, 1000.0)
            .with(EqParam::HiGain, 6.0),
    );

    let input = sine(1000.0, 0.5, SAMPLE_RATE as usize);
    let mut left = input.clone();
    let mut right = input.clone();
    for (l, r) in left.chunks_mut(BLOCK).zip(right.chunks_mut(BLOCK)) {
        engine.process(0, l);
        engine.process(1, r);
    }

    // Second half: 500 whole periods, well past the filter transient
    let half = input.len() / 2;
    let gain = to_db(rms(&left[half..]) / rms(&input[half..]));
    assert!((gain - 6.0).abs() < 0.5, "measured {gain:.2} dB");
    assert_eq!(left, right);
}

#[test]
fn smoothed_boost_reaches_six_db() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 1);

    let mut input = sine(1000.0, 0.5, SAMPLE_RATE as usize);
    let reference = input.clone();
    // One block first so the update below is smoothed
    engine.process(0, &mut input[..BLOCK]);
    engine.update_coefficients(
        ChainSettings::default()
            .with(EqParam::HiFreq, 1000.0)
            .with(EqParam::HiGain, 6.0),
    );
    assert!(engine.is_smoothing());
    process_mono(&mut engine, &mut input[BLOCK..]);
    assert!(!engine.is_smoothing());

    let half = input.len() / 2;
    let gain = to_db(rms(&input[half..]) / rms(&reference[half..]));
    assert!((gain - 6.0).abs() < 0.5, "measured {gain:.2} dB");
}

#[test]
fn gain_sweep_is_click_free() {
    let freq = 1000.0;
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 1);
    let start = ChainSettings::default()
        .with(EqParam::HiFreq, freq)
        .with(EqParam::HiGain, -24.0);
    engine.update_coefficients(start);

    let sweep_blocks = 48;
    let settle_blocks = 60;
    let total = (1 + sweep_blocks + settle_blocks) * BLOCK;
    let mut signal = sine(freq, 0.1, total);
    let mut blocks = signal.chunks_mut(BLOCK);

    if let Some(first) = blocks.next() {
        engine.process(0, first);
    }
    for k in 0..sweep_blocks {
        let gain = -24.0 + 48.0 * k as f32 / (sweep_blocks - 1) as f32;
        engine.update_coefficients(start.with(EqParam::HiGain, gain));
        if let Some(block) = blocks.next() {
            engine.process(0, block);
        }
    }
    for block in blocks {
        engine.process(0, block);
    }

    let sweep = &signal[BLOCK..(1 + sweep_blocks) * BLOCK];
    let steady = &signal[total - 4800..];
    let steady_step = max_step(steady);
    let sweep_step = max_step(sweep);

    // +24 dB on a 0.1 sine: ~1.58 peak, ~0.21 max step
    assert!(steady_step > 0.15, "steady step {steady_step}");
    assert!(
        sweep_step <= steady_step * 1.25,
        "sweep step {sweep_step} exceeds steady-state bound {steady_step}"
    );
}

// ============================================================================
// Cross-thread hand-off
// ============================================================================

#[test]
fn publisher_from_another_thread() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 2);
    let publisher = engine.publisher();

    let final_settings = ChainSettings::default()
        .with(EqParam::LoMidFreq, 500.0)
        .with(EqParam::LoMidGain, -12.0);

    let control = thread::spawn(move || {
        for i in 0..1000 {
            let gain = (i % 48) as f32 - 24.0;
            publisher.update_coefficients(ChainSettings::default().with(EqParam::HiGain, gain));
        }
        publisher.update_coefficients(final_settings);
    });

    let mut left = noise(21, BLOCK);
    let mut right = noise(22, BLOCK);
    while !control.is_finished() {
        engine.process(0, &mut left);
        engine.process(1, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
    }
    control.join().expect("control thread");

    engine.process(0, &mut left);
    engine.process(1, &mut right);
    assert_eq!(engine.settings(), final_settings);
}

#[test]
fn publisher_settings_apply_at_prepare() {
    let mut engine = EqualizerEngine::new();
    let publisher = engine.publisher();
    let settings = ChainSettings::default().with(EqParam::LowGain, 4.5);
    publisher.update_coefficients(settings);

    engine.prepare(SAMPLE_RATE, BLOCK, 1);
    assert_eq!(engine.settings(), settings);
    assert_eq!(engine.chain(0).expect("chain").current_settings(), settings);
}

#[test]
fn channel_order_does_not_matter_for_published_settings() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 2);
    let publisher = engine.publisher();

    let mut left = noise(31, BLOCK);
    let mut right = noise(32, BLOCK);
    engine.process(1, &mut right);
    engine.process(0, &mut left);

    publisher.update_coefficients(ChainSettings::default().with(EqParam::HiGain, 12.0));
    for _ in 0..3 {
        engine.process(1, &mut right);
        engine.process(0, &mut left);
    }

    let chain0 = engine.chain(0).expect("chain 0").current_settings();
    let chain1 = engine.chain(1).expect("chain 1").current_settings();
    assert!(chain0.hi_gain > 0.0, "update was picked up");
    assert_eq!(chain0, chain1);
    assert_eq!(
        engine.chain(0).expect("chain 0").coefficients(),
        engine.chain(1).expect("chain 1").coefficients()
    );
}

#[test]
fn single_non_zero_channel_picks_up_published_settings() {
    let mut engine = EqualizerEngine::new();
    engine.prepare(SAMPLE_RATE, BLOCK, 2);
    let publisher = engine.publisher();

    let mut right = noise(33, BLOCK);
    engine.process(1, &mut right);
    publisher.update_coefficients(ChainSettings::default().with(EqParam::LowGain, -6.0));
    engine.process(1, &mut right);

    assert_eq!(engine.settings().low_gain, -6.0);
    assert!(engine.chain(1).expect("chain 1").current_settings().low_gain < 0.0);
}

#[test]
fn zero_update_interval_does_not_stall() {
    let config = EngineConfig {
        update_interval: 0,
        ..EngineConfig::default()
    };
    let handle = thread::spawn(move || {
        let mut engine = EqualizerEngine::with_config(config);
        assert_eq!(engine.config().update_interval, 1);
        engine.prepare(SAMPLE_RATE, BLOCK, 1);
        let mut buf = noise(41, BLOCK);
        engine.process(0, &mut buf);
        engine.update_coefficients(ChainSettings::default().with(EqParam::HiGain, 6.0));
        engine.process(0, &mut buf);
        buf.iter().all(|s| s.is_finite())
    });

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while !handle.is_finished() {
        assert!(std::time::Instant::now() < deadline, "process() did not return");
        thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(handle.join().expect("audio thread"));
}
