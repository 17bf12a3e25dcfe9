//! Engine configuration, loaded from TOML.
//!
//! Everything here is set once per session rather than automated: the band
//! quality factor, cut-filter slopes and smoothing behavior.
//!
//! ```toml
//! band_q = 1.0
//! hp_slope = "24db"
//! lp_slope = "12db"
//! smoothing_ms = 20.0
//! update_interval = 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::design::{MAX_Q, MIN_Q, Slope, clamp_q};
use crate::error::ConfigError;

/// Longest accepted smoothing time.
pub const MAX_SMOOTHING_MS: f32 = 1000.0;

/// Largest accepted coefficient update interval in samples.
pub const MAX_UPDATE_INTERVAL: usize = 1024;

/// Session-level engine configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quality factor shared by the four peaking bands.
    pub band_q: f32,
    /// High-pass steepness.
    pub hp_slope: Slope,
    /// Low-pass steepness.
    pub lp_slope: Slope,
    /// One-pole smoothing time constant for parameter transitions.
    /// Zero applies changes at the next block.
    pub smoothing_ms: f32,
    /// Samples between coefficient recomputes while a transition runs.
    pub update_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            band_q: 1.0,
            hp_slope: Slope::Db12,
            lp_slope: Slope::Db12,
            smoothing_ms: 20.0,
            update_interval: 32,
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded engine config");
        Ok(config)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Copy with every field forced into its accepted range.
    ///
    /// Used where a config reaches the audio path without going through
    /// [`validate`](Self::validate). Non-finite smoothing times fall back to
    /// the default.
    pub fn sanitized(&self) -> Self {
        let smoothing_ms = if self.smoothing_ms.is_finite() {
            self.smoothing_ms.clamp(0.0, MAX_SMOOTHING_MS)
        } else {
            Self::default().smoothing_ms
        };
        Self {
            band_q: clamp_q(self.band_q),
            hp_slope: self.hp_slope,
            lp_slope: self.lp_slope,
            smoothing_ms,
            update_interval: self.update_interval.clamp(1, MAX_UPDATE_INTERVAL),
        }
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_Q..=MAX_Q).contains(&self.band_q) {
            return Err(ConfigError::invalid_value(
                "band_q",
                format!("must be between {MIN_Q} and {MAX_Q}, got {}", self.band_q),
            ));
        }
        if !(0.0..=MAX_SMOOTHING_MS).contains(&self.smoothing_ms) {
            return Err(ConfigError::invalid_value(
                "smoothing_ms",
                format!(
                    "must be between 0 and {MAX_SMOOTHING_MS}, got {}",
                    self.smoothing_ms
                ),
            ));
        }
        if !(1..=MAX_UPDATE_INTERVAL).contains(&self.update_interval) {
            return Err(ConfigError::invalid_value(
                "update_interval",
                format!(
                    "must be between 1 and {MAX_UPDATE_INTERVAL}, got {}",
                    self.update_interval
                ),
            ));
        }
        Ok(())
    }
}
