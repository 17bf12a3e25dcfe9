//! Whole-chain coefficient design and analytic frequency response.

use peq_core::{BiquadCoefficients, linear_to_db};

use crate::config::EngineConfig;
use crate::design::{Band, CutDesign, CutKind, peak_coefficients};
use crate::settings::ChainSettings;

/// Coefficients for every stage of a channel chain.
///
/// Stage order matches processing: high-pass, the four bands lowest first,
/// low-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    /// High-pass cascade.
    pub high_pass: CutDesign,
    /// Peaking bands in [`Band::ALL`] order.
    pub bands: [BiquadCoefficients; 4],
    /// Low-pass cascade.
    pub low_pass: CutDesign,
    sample_rate: f32,
}

impl ChainCoefficients {
    /// Designs every stage for `settings` at `sample_rate`.
    pub fn design(settings: &ChainSettings, config: &EngineConfig, sample_rate: f32) -> Self {
        let bands = Band::ALL.map(|band| {
            peak_coefficients(
                settings.get(band.frequency_param()),
                settings.get(band.gain_param()),
                config.band_q,
                sample_rate,
            )
        });
        Self {
            high_pass: CutDesign::new(
                CutKind::HighPass,
                settings.hp_freq,
                config.hp_slope,
                sample_rate,
            ),
            bands,
            low_pass: CutDesign::new(
                CutKind::LowPass,
                settings.lp_freq,
                config.lp_slope,
                sample_rate,
            ),
            sample_rate,
        }
    }

    /// Sample rate the stages were designed for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Every section in processing order.
    pub fn sections(&self) -> impl Iterator<Item = &BiquadCoefficients> {
        self.high_pass
            .sections()
            .iter()
            .chain(self.bands.iter())
            .chain(self.low_pass.sections())
    }

    /// `true` if every section has finite coefficients and poles inside the
    /// unit circle.
    pub fn is_stable(&self) -> bool {
        self.sections().all(|c| c.is_finite() && c.is_stable())
    }

    /// Linear magnitude `|H(e^jw)|` of the whole chain at `frequency` Hz.
    pub fn magnitude(&self, frequency: f32) -> f32 {
        let bands: f32 = self
            .bands
            .iter()
            .map(|c| c.magnitude_at(frequency, self.sample_rate))
            .product();
        self.high_pass.magnitude_at(frequency, self.sample_rate)
            * bands
            * self.low_pass.magnitude_at(frequency, self.sample_rate)
    }

    /// Magnitude of the whole chain in dB at `frequency` Hz.
    pub fn magnitude_db(&self, frequency: f32) -> f32 {
        linear_to_db(self.magnitude(frequency))
    }
}

/// `points` frequencies spaced logarithmically from `min_hz` to `max_hz`
/// inclusive.
pub fn log_frequencies(points: usize, min_hz: f32, max_hz: f32) -> Vec<f32> {
    match points {
        0 => Vec::new(),
        1 => vec![min_hz],
        _ => {
            let ratio = max_hz / min_hz;
            (0..points)
                .map(|i| min_hz * libm::powf(ratio, i as f32 / (points - 1) as f32))
                .collect()
        }
    }
}
