//! Per-channel filter chain: HP → low → lo-mid → hi-mid → hi → LP.
//!
//! Each [`ChannelChain`] owns its own smoothers, coefficients and delay
//! memory. Chains that receive the same targets and the same block lengths
//! follow identical coefficient trajectories, so channels never share
//! mutable state and can be processed independently.
//!
//! While a transition is in progress, the smoothed parameter values advance
//! once per `update_interval` samples and every stage is redesigned from
//! them. Between transitions the chain runs without any per-sample
//! parameter work.

use peq_core::{Biquad, SmoothedParam};

use crate::config::EngineConfig;
use crate::design::{CutDesign, MAX_CUT_SECTIONS};
use crate::params::EqParam;
use crate::response::ChainCoefficients;
use crate::settings::ChainSettings;

/// Cascade of up to four biquads forming a Butterworth cut filter.
#[derive(Debug, Clone, Default)]
struct CutFilter {
    stages: [Biquad; MAX_CUT_SECTIONS],
    active: usize,
}

impl CutFilter {
    fn apply(&mut self, design: &CutDesign) {
        let sections = design.sections();
        // Sections joining the cascade start from silence.
        for stage in &mut self.stages[self.active.min(sections.len())..sections.len()] {
            stage.clear();
        }
        for (stage, coeffs) in self.stages.iter_mut().zip(sections) {
            stage.set_normalized(*coeffs);
        }
        self.active = sections.len();
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.stages[..self.active]
            .iter_mut()
            .fold(input, |acc, stage| stage.process(acc))
    }

    fn clear(&mut self) {
        self.stages.iter_mut().for_each(Biquad::clear);
    }

    fn flush_denormals(&mut self) {
        self.stages.iter_mut().for_each(Biquad::flush_denormals);
    }

    fn is_silent(&self) -> bool {
        self.stages.iter().all(Biquad::is_silent)
    }
}

/// The filter chain for one audio channel.
#[derive(Debug, Clone)]
pub struct ChannelChain {
    /// Smoothed parameter values in [`EqParam`] layout order.
    smoothers: [SmoothedParam; EqParam::COUNT],
    high_pass: CutFilter,
    /// Peaking bands, lowest first.
    bands: [Biquad; 4],
    low_pass: CutFilter,
    coeffs: ChainCoefficients,
    config: EngineConfig,
    sample_rate: f32,
    smoothing: bool,
    /// Samples left before the next smoothing step.
    countdown: usize,
}

impl ChannelChain {
    /// Creates a chain already settled on `settings`, with silent memory.
    ///
    /// Out-of-range config fields are clamped (see [`EngineConfig::sanitized`]).
    pub fn new(settings: &ChainSettings, config: &EngineConfig, sample_rate: f32) -> Self {
        let config = &config.sanitized();
        let values = settings.to_values();
        let smoothers = core::array::from_fn(|i| {
            SmoothedParam::with_config(values[i], sample_rate, config.smoothing_ms)
        });
        let mut chain = Self {
            smoothers,
            high_pass: CutFilter::default(),
            bands: Default::default(),
            low_pass: CutFilter::default(),
            coeffs: ChainCoefficients::design(settings, config, sample_rate),
            config: config.clone(),
            sample_rate,
            smoothing: false,
            countdown: 0,
        };
        chain.apply_coefficients();
        chain
    }

    /// Starts a smoothed transition towards `settings`.
    pub fn set_targets(&mut self, settings: &ChainSettings) {
        for (smoother, value) in self.smoothers.iter_mut().zip(settings.to_values()) {
            smoother.set_target(value);
        }
        self.smoothing = self.smoothers.iter().any(|s| !s.is_settled());
        self.countdown = 0;
    }

    /// Jumps straight to `settings` and redesigns every stage.
    pub fn apply_immediately(&mut self, settings: &ChainSettings) {
        for (smoother, value) in self.smoothers.iter_mut().zip(settings.to_values()) {
            smoother.set_immediate(value);
        }
        self.smoothing = false;
        self.countdown = 0;
        self.redesign();
    }

    /// Replaces the chain configuration and redesigns from the current
    /// smoothed values. Out-of-range fields are clamped.
    pub fn set_config(&mut self, config: &EngineConfig) {
        let config = &config.sanitized();
        for smoother in &mut self.smoothers {
            smoother.set_smoothing_time_ms(config.smoothing_ms);
        }
        self.config = config.clone();
        self.countdown = self.countdown.min(self.config.update_interval);
        self.redesign();
    }

    /// Filters `samples` in place.
    pub fn process(&mut self, samples: &mut [f32]) {
        let mut offset = 0;
        while offset < samples.len() {
            if self.smoothing && self.countdown == 0 {
                self.step_smoothing();
            }
            let remaining = samples.len() - offset;
            let run = if self.smoothing {
                self.countdown.min(remaining)
            } else {
                remaining
            };
            for sample in &mut samples[offset..offset + run] {
                *sample = self.tick(*sample);
            }
            if self.smoothing {
                self.countdown -= run;
            }
            offset += run;
        }

        self.high_pass.flush_denormals();
        self.bands.iter_mut().for_each(Biquad::flush_denormals);
        self.low_pass.flush_denormals();
    }

    /// Zeroes all delay memory. Coefficients and smoothing state are kept.
    pub fn clear(&mut self) {
        self.high_pass.clear();
        self.bands.iter_mut().for_each(Biquad::clear);
        self.low_pass.clear();
    }

    /// `true` if every delay element is zero.
    pub fn is_silent(&self) -> bool {
        self.high_pass.is_silent() && self.bands.iter().all(Biquad::is_silent) && self.low_pass.is_silent()
    }

    /// `true` while a smoothed transition is in progress.
    pub fn is_smoothing(&self) -> bool {
        self.smoothing
    }

    /// The smoothed values the current coefficients were designed from.
    pub fn current_settings(&self) -> ChainSettings {
        ChainSettings::from_values(&core::array::from_fn(|i| self.smoothers[i].get()))
    }

    /// Coefficients currently in use.
    pub fn coefficients(&self) -> &ChainCoefficients {
        &self.coeffs
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let x = self.high_pass.process(input);
        let x = self.bands.iter_mut().fold(x, |acc, band| band.process(acc));
        self.low_pass.process(x)
    }

    fn step_smoothing(&mut self) {
        let interval = self.config.update_interval;
        for smoother in &mut self.smoothers {
            smoother.advance_by(interval);
        }
        self.smoothing = self.smoothers.iter().any(|s| !s.is_settled());
        self.countdown = interval;
        self.redesign();
    }

    fn redesign(&mut self) {
        self.coeffs =
            ChainCoefficients::design(&self.current_settings(), &self.config, self.sample_rate);
        self.apply_coefficients();
    }

    fn apply_coefficients(&mut self) {
        self.high_pass.apply(&self.coeffs.high_pass);
        for (band, coeffs) in self.bands.iter_mut().zip(self.coeffs.bands) {
            band.set_normalized(coeffs);
        }
        self.low_pass.apply(&self.coeffs.low_pass);
    }
}
