//! Immutable snapshot of the ten equalizer parameters.

use peq_core::{ParamDescriptor, ParameterInfo};
use serde::{Deserialize, Serialize};

use crate::params::EqParam;

/// One consistent set of equalizer parameter values.
///
/// Captured once per audio block from the parameter store and handed to the
/// engine as a whole, so the audio thread never mixes values from two edits.
/// After [`clamped`](Self::clamped) every frequency lies in its declared
/// range and every gain within ±24 dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// High band center frequency in Hz.
    pub hi_freq: f32,
    /// High band gain in dB.
    pub hi_gain: f32,
    /// High-mid band center frequency in Hz.
    pub hi_mid_freq: f32,
    /// High-mid band gain in dB.
    pub hi_mid_gain: f32,
    /// Low-mid band center frequency in Hz.
    pub lo_mid_freq: f32,
    /// Low-mid band gain in dB.
    pub lo_mid_gain: f32,
    /// Low band center frequency in Hz.
    pub low_freq: f32,
    /// Low band gain in dB.
    pub low_gain: f32,
    /// High-pass cutoff in Hz. At its minimum the filter is bypassed.
    pub hp_freq: f32,
    /// Low-pass cutoff in Hz. At its maximum the filter is bypassed.
    pub lp_freq: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        let mut values = [0.0; EqParam::COUNT];
        for p in EqParam::ALL {
            values[p.index()] = p.descriptor().default;
        }
        Self::from_values(&values)
    }
}

impl ChainSettings {
    /// Builds settings from values in parameter layout order.
    ///
    /// Values are taken as-is; call [`clamped`](Self::clamped) to enforce
    /// the declared ranges.
    pub fn from_values(values: &[f32; EqParam::COUNT]) -> Self {
        Self {
            hi_freq: values[EqParam::HiFreq.index()],
            hi_mid_freq: values[EqParam::HiMidFreq.index()],
            lo_mid_freq: values[EqParam::LoMidFreq.index()],
            low_freq: values[EqParam::LowFreq.index()],
            hp_freq: values[EqParam::HpFreq.index()],
            lp_freq: values[EqParam::LpFreq.index()],
            hi_gain: values[EqParam::HiGain.index()],
            hi_mid_gain: values[EqParam::HiMidGain.index()],
            lo_mid_gain: values[EqParam::LoMidGain.index()],
            low_gain: values[EqParam::LowGain.index()],
        }
    }

    /// Values in parameter layout order.
    pub fn to_values(&self) -> [f32; EqParam::COUNT] {
        EqParam::ALL.map(|p| self.get(p))
    }

    /// Value of one parameter.
    pub fn get(&self, param: EqParam) -> f32 {
        match param {
            EqParam::HiFreq => self.hi_freq,
            EqParam::HiMidFreq => self.hi_mid_freq,
            EqParam::LoMidFreq => self.lo_mid_freq,
            EqParam::LowFreq => self.low_freq,
            EqParam::HpFreq => self.hp_freq,
            EqParam::LpFreq => self.lp_freq,
            EqParam::HiGain => self.hi_gain,
            EqParam::HiMidGain => self.hi_mid_gain,
            EqParam::LoMidGain => self.lo_mid_gain,
            EqParam::LowGain => self.low_gain,
        }
    }

    /// Sets one parameter, clamped to its declared range.
    pub fn set(&mut self, param: EqParam, value: f32) {
        let value = param.descriptor().clamp(value);
        let field = match param {
            EqParam::HiFreq => &mut self.hi_freq,
            EqParam::HiMidFreq => &mut self.hi_mid_freq,
            EqParam::LoMidFreq => &mut self.lo_mid_freq,
            EqParam::LowFreq => &mut self.low_freq,
            EqParam::HpFreq => &mut self.hp_freq,
            EqParam::LpFreq => &mut self.lp_freq,
            EqParam::HiGain => &mut self.hi_gain,
            EqParam::HiMidGain => &mut self.hi_mid_gain,
            EqParam::LoMidGain => &mut self.lo_mid_gain,
            EqParam::LowGain => &mut self.low_gain,
        };
        *field = value;
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, param: EqParam, value: f32) -> Self {
        self.set(param, value);
        self
    }

    /// Every field clamped to its declared range. NaN falls back to the
    /// parameter default.
    pub fn clamped(&self) -> Self {
        let values = EqParam::ALL.map(|p| p.descriptor().clamp(self.get(p)));
        Self::from_values(&values)
    }

    /// `true` when every band is at 0 dB and both cut filters sit at their
    /// pass-through extremes.
    pub fn is_flat(&self) -> bool {
        self.hi_gain == 0.0
            && self.hi_mid_gain == 0.0
            && self.lo_mid_gain == 0.0
            && self.low_gain == 0.0
            && self.hp_freq <= EqParam::HpFreq.descriptor().min
            && self.lp_freq >= EqParam::LpFreq.descriptor().max
    }
}

impl ParameterInfo for ChainSettings {
    fn param_count(&self) -> usize {
        EqParam::COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        EqParam::from_index(index).map(EqParam::descriptor)
    }

    fn get_param(&self, index: usize) -> f32 {
        EqParam::from_index(index).map_or(0.0, |p| self.get(p))
    }

    fn set_param(&mut self, index: usize, value: f32) {
        if let Some(p) = EqParam::from_index(index) {
            self.set(p, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peq_core::ParamId;

    #[test]
    fn default_matches_descriptors() {
        let s = ChainSettings::default();
        assert_eq!(s.hi_freq, 800.0);
        assert_eq!(s.hi_mid_freq, 400.0);
        assert_eq!(s.lo_mid_freq, 200.0);
        assert_eq!(s.low_freq, 40.0);
        assert_eq!(s.hp_freq, 25.0);
        assert_eq!(s.lp_freq, 20000.0);
        assert_eq!(s.hi_gain, 0.0);
        assert!(s.is_flat());
    }

    #[test]
    fn values_round_trip_in_layout_order() {
        let values = [1000.0, 2000.0, 300.0, 100.0, 80.0, 12000.0, 3.0, -3.0, 1.5, -1.5];
        let s = ChainSettings::from_values(&values);
        assert_eq!(s.hi_freq, 1000.0);
        assert_eq!(s.lp_freq, 12000.0);
        assert_eq!(s.low_gain, -1.5);
        assert_eq!(s.to_values(), values);
    }

    #[test]
    fn clamped_enforces_ranges() {
        let mut raw = ChainSettings::default();
        raw.hi_gain = 100.0;
        raw.low_gain = -100.0;
        raw.hp_freq = 1.0;
        raw.lp_freq = 1.0e6;
        raw.hi_mid_freq = f32::NAN;

        let s = raw.clamped();
        assert_eq!(s.hi_gain, 24.0);
        assert_eq!(s.low_gain, -24.0);
        assert_eq!(s.hp_freq, 25.0);
        assert_eq!(s.lp_freq, 20000.0);
        assert_eq!(s.hi_mid_freq, 400.0);
    }

    #[test]
    fn set_clamps() {
        let s = ChainSettings::default()
            .with(EqParam::HiFreq, 50000.0)
            .with(EqParam::LoMidGain, -30.0);
        assert_eq!(s.hi_freq, 16000.0);
        assert_eq!(s.lo_mid_gain, -24.0);
        assert!(!s.is_flat());
    }

    #[test]
    fn parameter_info_view() {
        let mut s = ChainSettings::default();
        assert_eq!(s.param_count(), 10);
        assert_eq!(s.find_param_by_name("lp_freq"), Some(5));
        assert_eq!(s.param_index_by_id(ParamId(106)), Some(6));

        s.set_param(6, 6.0);
        assert_eq!(s.hi_gain, 6.0);
        assert_eq!(s.get_param(6), 6.0);

        // Out of bounds is ignored
        s.set_param(42, 1.0);
        assert_eq!(s.get_param(42), 0.0);
        assert!(s.param_info(10).is_none());
    }

    #[test]
    fn every_param_clamps_to_descriptor_bounds() {
        let mut s = ChainSettings::default();
        for i in 0..s.param_count() {
            let desc = s.param_info(i).expect("descriptor");
            s.set_param(i, desc.max + 1.0e5);
            assert_eq!(s.get_param(i), desc.max, "{}", desc.name);
            s.set_param(i, desc.min - 1.0e5);
            assert_eq!(s.get_param(i), desc.min, "{}", desc.name);
        }
    }
}
