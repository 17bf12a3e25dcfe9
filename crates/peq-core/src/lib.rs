//! peq Core - DSP primitives for the four-band parametric equalizer
//!
//! This crate provides the building blocks the equalizer engine is assembled
//! from, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR section (Direct Form I)
//! - [`BiquadCoefficients`] - Normalized coefficient set with stability and
//!   analytic magnitude queries
//! - RBJ cookbook designs: [`peaking_eq_coefficients`],
//!   [`lowpass_coefficients`], [`highpass_coefficients`]
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing with per-sample and
//!   per-chunk advance
//!
//! ## Parameter Introspection
//!
//! - [`ParameterInfo`] - Uniform view of a processor's parameters
//! - [`ParamDescriptor`] - Name, range, default, unit, and stable id
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`flush_denormal`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! peq-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use peq_core::{Biquad, BiquadCoefficients, peaking_eq_coefficients};
//!
//! let coeffs = BiquadCoefficients::from_raw(peaking_eq_coefficients(1000.0, 1.0, 6.0, 48000.0));
//! let mut band = Biquad::new();
//! band.set_normalized(coeffs);
//!
//! let out = band.process(0.25);
//! assert!(out.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod math;
pub mod param;
pub mod param_info;

// Re-export main types at crate root
pub use biquad::{
    Biquad, BiquadCoefficients, highpass_coefficients, lowpass_coefficients,
    peaking_eq_coefficients,
};
pub use math::{db_to_linear, flush_denormal, linear_to_db};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamId, ParamScale, ParamUnit, ParameterInfo};
