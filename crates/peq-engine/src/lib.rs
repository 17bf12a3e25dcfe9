//! peq Engine - four-band parametric equalizer
//!
//! Ten parameters (four band frequencies, four band gains, a high-pass and a
//! low-pass cutoff) drive a per-channel chain of biquad filters:
//!
//! ```text
//! in -> HP -> LOW -> LO-MID -> HI-MID -> HI -> LP -> out
//! ```
//!
//! # Modules
//!
//! - [`params`] - [`EqParam`], the stable parameter layout
//! - [`settings`] - [`ChainSettings`], one consistent parameter snapshot
//! - [`design`] - clamping, peaking and Butterworth cut-filter design
//! - [`response`] - [`ChainCoefficients`] and the analytic frequency response
//! - [`chain`] - [`ChannelChain`], smoothed per-channel processing
//! - [`slot`] - [`SettingsPublisher`], lock-free hand-off to the audio thread
//! - [`engine`] - [`EqualizerEngine`], lifecycle and channel management
//! - [`config`] - [`EngineConfig`], TOML session configuration
//!
//! # Real-time safety
//!
//! [`EqualizerEngine::process`], [`EqualizerEngine::process_block`],
//! [`EqualizerEngine::update_coefficients`] and [`EqualizerEngine::reset`]
//! never allocate, lock or log. `prepare`, `release` and `set_config` are
//! setup paths.

pub mod chain;
pub mod config;
pub mod design;
pub mod engine;
pub mod error;
pub mod params;
pub mod response;
pub mod settings;
pub mod slot;

pub use chain::ChannelChain;
pub use config::EngineConfig;
pub use design::{Band, CutDesign, CutKind, Slope};
pub use engine::{EngineState, EqualizerEngine, FALLBACK_SAMPLE_RATE};
pub use error::ConfigError;
pub use params::EqParam;
pub use response::{ChainCoefficients, log_frequencies};
pub use settings::ChainSettings;
pub use slot::{SettingsPublisher, SettingsSlot};
