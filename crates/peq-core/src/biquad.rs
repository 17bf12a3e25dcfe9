//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a second-order IIR section plus the coefficient formulas an
//! equalizer needs: peaking bands and the low/high-pass sections used to build
//! cut filters.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

use crate::math::{flush_denormal, linear_to_db};

/// Normalized biquad coefficients (`a0 == 1`).
///
/// Kept separate from [`Biquad`] so a full coefficient set can be designed,
/// inspected, and handed to a filter in one assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient for x[n]
    pub b0: f32,
    /// Feedforward coefficient for x[n-1]
    pub b1: f32,
    /// Feedforward coefficient for x[n-2]
    pub b2: f32,
    /// Feedback coefficient for y[n-1]
    pub a1: f32,
    /// Feedback coefficient for y[n-2]
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Passthrough coefficients: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalizes a raw `(b0, b1, b2, a0, a1, a2)` tuple by `a0`.
    ///
    /// Accepts the output of the cookbook functions in this module directly.
    pub fn from_raw((b0, b1, b2, a0, a1, a2): (f32, f32, f32, f32, f32, f32)) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Returns `true` if both poles lie strictly inside the unit circle.
    ///
    /// Uses the stability triangle for `1 + a1 z^-1 + a2 z^-2`:
    /// `|a2| < 1` and `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Returns `true` if every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Linear magnitude response `|H(e^jw)|` at `frequency` Hz.
    ///
    /// Evaluates the transfer function analytically on the unit circle, so no
    /// processing or state is involved.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * PI * frequency / sample_rate;
        let (cos1, sin1) = (cosf(omega), sinf(omega));
        let (cos2, sin2) = (cosf(2.0 * omega), sinf(2.0 * omega));

        let num_re = self.b0 + self.b1 * cos1 + self.b2 * cos2;
        let num_im = -(self.b1 * sin1 + self.b2 * sin2);
        let den_re = 1.0 + self.a1 * cos1 + self.a2 * cos2;
        let den_im = -(self.a1 * sin1 + self.a2 * sin2);

        let num = sqrtf(num_re * num_re + num_im * num_im);
        let den = sqrtf(den_re * den_re + den_im * den_im);
        if den <= f32::MIN_POSITIVE { 0.0 } else { num / den }
    }

    /// Magnitude response in dB at `frequency` Hz.
    pub fn magnitude_db_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        linear_to_db(self.magnitude_at(frequency, sample_rate))
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// Direct Form I keeps the input and output history separately, which makes
/// coefficient changes between samples well behaved: the stored history is
/// the real signal, not an internal state that depends on the old taps.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self {
            coeffs: BiquadCoefficients::IDENTITY,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the coefficients with an already-normalized set.
    ///
    /// Delay memory is left untouched.
    #[inline]
    pub fn set_normalized(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current normalized coefficients.
    #[inline]
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Processes a single sample through the biquad filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state (delay lines).
    ///
    /// Useful for resetting the filter without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Flushes denormal values out of the delay lines.
    ///
    /// Cheap enough to call once per processed block; keeps a decaying tail
    /// from dropping into the denormal range where some CPUs slow down.
    #[inline]
    pub fn flush_denormals(&mut self) {
        self.x1 = flush_denormal(self.x1);
        self.x2 = flush_denormal(self.x2);
        self.y1 = flush_denormal(self.y1);
        self.y2 = flush_denormal(self.y2);
    }

    /// Returns `true` if all delay memory is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `frequency` - Cutoff frequency in Hz
/// * `q` - Q factor (typically 0.707 for Butterworth response)
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `frequency` - Cutoff frequency in Hz
/// * `q` - Q factor (typically 0.707 for Butterworth response)
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates peaking EQ filter coefficients using the RBJ cookbook formula.
///
/// A peaking EQ boosts or cuts around a center frequency with a specified bandwidth.
/// Used for parametric equalizers.
///
/// # Arguments
///
/// * `frequency` - Center frequency in Hz
/// * `q` - Q factor (bandwidth = frequency / Q)
/// * `gain_db` - Gain in decibels (positive = boost, negative = cut)
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn peaking_eq_coefficients(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0); // sqrt(10^(dB/20))
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha / a;

    (b0, b1, b2, a0, a1, a2)
}
