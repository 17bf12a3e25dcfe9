//! Parameter handling with smoothing for zipper-free changes.
//!
//! Audio parameters (gain, frequency, etc.) need smooth transitions to avoid
//! audible "zipper noise" when values change. This module provides
//! [`SmoothedParam`], a one-pole (exponential) smoother that can be advanced
//! one sample at a time or a whole control-rate chunk at once.
//!
//! ## Usage
//!
//! ```rust
//! use peq_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::new(1.0);
//! gain.set_sample_rate(48000.0);
//! gain.set_smoothing_time_ms(10.0); // 10ms smoothing
//!
//! // Set new target - smoothing happens automatically
//! gain.set_target(0.5);
//!
//! // In audio callback, get smoothed value each sample
//! for _ in 0..480 { // 10ms at 48kHz
//!     let smoothed_gain = gain.advance();
//!     // Use smoothed_gain for processing...
//! }
//!
//! // Or jump a whole 32-sample chunk
//! let value = gain.advance_by(32);
//! assert!(value > 0.5 && value < 1.0);
//! ```

use libm::{expf, powf};

/// Relative distance to the target below which a parameter counts as settled.
const SETTLE_EPSILON: f32 = 1e-6;

/// A parameter with built-in smoothing for zipper-free changes.
///
/// Uses exponential smoothing (one-pole lowpass), which provides
/// natural-sounding transitions for gain and frequency controls.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant, ~0 = very slow)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Smoothing time in milliseconds
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with initial value.
    ///
    /// Smoothing is disabled by default (instant changes). Call
    /// [`set_sample_rate`](Self::set_sample_rate) and
    /// [`set_smoothing_time_ms`](Self::set_smoothing_time_ms) to enable.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Smoothing time constant in milliseconds
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the target value (parameter will smooth towards this).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and immediately snap to it (no smoothing).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate smoothing coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set smoothing time in milliseconds.
    ///
    /// Typical values:
    /// - 0.0 ms: No smoothing (instant)
    /// - 5-10 ms: Fast, good for gain
    /// - 20-50 ms: Medium, good for filter cutoff
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Smoothing time in milliseconds.
    #[inline]
    pub fn smoothing_time_ms(&self) -> f32 {
        self.smoothing_time_ms
    }

    /// Get the next smoothed value (advances by one sample).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        // One-pole lowpass: y[n] = y[n-1] + coeff * (target - y[n-1])
        self.current += self.coeff * (self.target - self.current);
        if self.is_settled() {
            self.current = self.target;
        }
        self.current
    }

    /// Advance by `samples` samples at once.
    ///
    /// Closed form of calling [`advance`](Self::advance) `samples` times:
    /// the remaining distance decays by `(1 - coeff)^samples`. Used for
    /// control-rate updates where coefficients are recomputed once per chunk.
    #[inline]
    pub fn advance_by(&mut self, samples: usize) -> f32 {
        if samples == 0 {
            return self.current;
        }
        if self.coeff >= 1.0 {
            self.current = self.target;
            return self.current;
        }
        let decay = powf(1.0 - self.coeff, samples as f32);
        self.current = self.target + (self.current - self.target) * decay;
        if self.is_settled() {
            self.current = self.target;
        }
        self.current
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Check if the parameter has reached its target.
    ///
    /// The tolerance is relative to the target's magnitude (floored at 1.0),
    /// so large values such as frequencies in Hz settle despite f32 rounding.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() <= SETTLE_EPSILON * self.target.abs().max(1.0)
    }

    /// Recalculate the smoothing coefficient from sample rate and smoothing time.
    ///
    /// A one-pole lowpass `y[n] = y[n-1] + coeff * (target - y[n-1])` has a
    /// time constant tau (time to reach 63.2% of target) of:
    ///
    ///   `coeff = 1 - exp(-1 / (tau * sample_rate))`
    ///
    /// where `tau = smoothing_time_ms / 1000`. After 5*tau the parameter
    /// reaches 99.3% of the target.
    ///
    /// When smoothing_time_ms is 0, coeff is set to 1.0 for instant response.
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let time_constant = self.smoothing_time_ms / 1000.0;
            let samples = time_constant * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
