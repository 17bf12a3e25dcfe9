//! Arguments shared by the commands that build an equalizer.

use anyhow::Context;
use clap::Args;
use peq_core::ParameterInfo;
use peq_engine::{ChainSettings, EngineConfig, EqParam, Slope};
use std::path::PathBuf;

/// Parse a `key=value` pair.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Equalizer settings and engine configuration from the command line.
///
/// Unset values keep their defaults. Out-of-range values are clamped.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// HI band center frequency
    #[arg(long, value_name = "HZ")]
    pub hi_freq: Option<f32>,

    /// HI band gain
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub hi_gain: Option<f32>,

    /// HI-MID band center frequency
    #[arg(long, value_name = "HZ")]
    pub hi_mid_freq: Option<f32>,

    /// HI-MID band gain
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub hi_mid_gain: Option<f32>,

    /// LO-MID band center frequency
    #[arg(long, value_name = "HZ")]
    pub lo_mid_freq: Option<f32>,

    /// LO-MID band gain
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub lo_mid_gain: Option<f32>,

    /// LOW band center frequency
    #[arg(long, value_name = "HZ")]
    pub low_freq: Option<f32>,

    /// LOW band gain
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub low_gain: Option<f32>,

    /// High-pass cutoff (25 Hz bypasses the filter)
    #[arg(long, value_name = "HZ")]
    pub hp_freq: Option<f32>,

    /// Low-pass cutoff (20000 Hz bypasses the filter)
    #[arg(long, value_name = "HZ")]
    pub lp_freq: Option<f32>,

    /// Any parameter by name (e.g. "lo_mid_gain=-3")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    pub param: Vec<(String, String)>,

    /// Engine configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// High-pass slope, overriding the config file (12db, 24db, 36db, 48db)
    #[arg(long, value_name = "SLOPE")]
    pub hp_slope: Option<Slope>,

    /// Low-pass slope, overriding the config file (12db, 24db, 36db, 48db)
    #[arg(long, value_name = "SLOPE")]
    pub lp_slope: Option<Slope>,
}

impl SettingsArgs {
    /// Resolve the arguments into clamped settings.
    ///
    /// Dedicated flags are applied first, then `--param` pairs in order.
    pub fn settings(&self) -> anyhow::Result<ChainSettings> {
        let flags = [
            (EqParam::HiFreq, self.hi_freq),
            (EqParam::HiGain, self.hi_gain),
            (EqParam::HiMidFreq, self.hi_mid_freq),
            (EqParam::HiMidGain, self.hi_mid_gain),
            (EqParam::LoMidFreq, self.lo_mid_freq),
            (EqParam::LoMidGain, self.lo_mid_gain),
            (EqParam::LowFreq, self.low_freq),
            (EqParam::LowGain, self.low_gain),
            (EqParam::HpFreq, self.hp_freq),
            (EqParam::LpFreq, self.lp_freq),
        ];

        let mut settings = ChainSettings::default();
        for (param, value) in flags {
            if let Some(value) = value {
                apply(&mut settings, param.index(), value);
            }
        }

        for (key, value) in &self.param {
            let index = find_param(&settings, key)
                .ok_or_else(|| anyhow::anyhow!("Unknown parameter: {}", key))?;
            let value: f32 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {}: '{}'", key, value))?;
            apply(&mut settings, index, value);
        }

        Ok(settings)
    }

    /// Load the engine configuration, or defaults when no file is given.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(slope) = self.hp_slope {
            config.hp_slope = slope;
        }
        if let Some(slope) = self.lp_slope {
            config.lp_slope = slope;
        }
        Ok(config)
    }
}

/// Looks a parameter up by name, short name or string id. Dashes may stand
/// in for underscores in string ids (`lo-mid-gain`).
fn find_param(params: &impl ParameterInfo, key: &str) -> Option<usize> {
    params
        .find_param_by_name(key)
        .or_else(|| params.find_param_by_name(&key.replace('-', "_")))
}

fn apply(params: &mut impl ParameterInfo, index: usize, value: f32) {
    let Some(desc) = params.param_info(index) else {
        return;
    };
    let clamped = desc.clamp(value);
    if clamped != value {
        tracing::warn!(
            param = desc.string_id,
            requested = value,
            applied = clamped,
            "value outside parameter range, clamped"
        );
    }
    params.set_param(index, clamped);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("hi_gain=-3").unwrap(),
            ("hi_gain".to_string(), "-3".to_string())
        );
        assert_eq!(
            parse_key_val("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_val("hi_gain").is_err());
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let args = SettingsArgs::default();
        assert_eq!(args.settings().unwrap(), ChainSettings::default());
        assert_eq!(args.engine_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn flags_and_params_apply() {
        let args = SettingsArgs {
            hi_gain: Some(4.0),
            lp_freq: Some(12000.0),
            param: vec![("lo-mid-gain".to_string(), "-6".to_string())],
            ..Default::default()
        };
        let settings = args.settings().unwrap();
        assert_eq!(settings.hi_gain, 4.0);
        assert_eq!(settings.lp_freq, 12000.0);
        assert_eq!(settings.lo_mid_gain, -6.0);
        assert_eq!(settings.low_gain, 0.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let args = SettingsArgs {
            low_gain: Some(40.0),
            hp_freq: Some(1.0),
            ..Default::default()
        };
        let settings = args.settings().unwrap();
        assert_eq!(settings.low_gain, 24.0);
        assert_eq!(settings.hp_freq, EqParam::HpFreq.descriptor().min);
    }

    #[test]
    fn params_resolve_by_any_name() {
        let settings = ChainSettings::default();
        assert_eq!(find_param(&settings, "hi_mid_freq"), Some(EqParam::HiMidFreq.index()));
        assert_eq!(find_param(&settings, "HI-MID Freq"), Some(EqParam::HiMidFreq.index()));
        assert_eq!(find_param(&settings, "lp-freq"), Some(EqParam::LpFreq.index()));
        assert_eq!(find_param(&settings, "presence"), None);
    }

    #[test]
    fn unknown_param_is_an_error() {
        let args = SettingsArgs {
            param: vec![("presence".to_string(), "3".to_string())],
            ..Default::default()
        };
        assert!(args.settings().is_err());
    }

    #[test]
    fn non_numeric_param_is_an_error() {
        let args = SettingsArgs {
            param: vec![("hi_gain".to_string(), "loud".to_string())],
            ..Default::default()
        };
        assert!(args.settings().is_err());
    }

    #[test]
    fn slope_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.toml");
        std::fs::write(&path, "hp_slope = \"24db\"\nlp_slope = \"36db\"\n").unwrap();

        let args = SettingsArgs {
            config: Some(path),
            lp_slope: Some(Slope::Db48),
            ..Default::default()
        };
        let config = args.engine_config().unwrap();
        assert_eq!(config.hp_slope, Slope::Db24);
        assert_eq!(config.lp_slope, Slope::Db48);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = SettingsArgs {
            config: Some(PathBuf::from("/nonexistent/peq.toml")),
            ..Default::default()
        };
        assert!(args.engine_config().is_err());
    }
}
