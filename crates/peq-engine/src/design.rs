//! Filter-stage design: clamping, peaking bands and Butterworth cut filters.
//!
//! Every coefficient set the engine uses comes from here. Inputs are clamped
//! before design so poles always stay inside the unit circle:
//!
//! | Quantity  | Range                        |
//! |-----------|------------------------------|
//! | Frequency | 10 Hz .. 0.475 × sample rate |
//! | Gain      | ±24 dB                       |
//! | Q         | 0.1 .. 18                    |

use core::fmt;
use core::str::FromStr;

use peq_core::{
    BiquadCoefficients, highpass_coefficients, lowpass_coefficients, peaking_eq_coefficients,
};
use serde::{Deserialize, Serialize};

use crate::params::EqParam;

/// Lowest frequency any stage is designed at.
pub const MIN_FREQUENCY_HZ: f32 = 10.0;

/// Highest design frequency as a fraction of the sample rate.
pub const MAX_FREQUENCY_RATIO: f32 = 0.475;

/// Largest boost or cut a band can apply.
pub const MAX_GAIN_DB: f32 = 24.0;

/// Smallest band quality factor.
pub const MIN_Q: f32 = 0.1;

/// Largest band quality factor.
pub const MAX_Q: f32 = 18.0;

/// Maximum number of second-order sections in a cut filter (8th order).
pub const MAX_CUT_SECTIONS: usize = 4;

/// Clamps a design frequency to `[10 Hz, 0.475 · sample_rate]`.
///
/// NaN maps to the lower bound.
#[inline]
pub fn clamp_frequency(frequency: f32, sample_rate: f32) -> f32 {
    let max = (MAX_FREQUENCY_RATIO * sample_rate).max(MIN_FREQUENCY_HZ);
    if frequency.is_nan() {
        MIN_FREQUENCY_HZ
    } else {
        frequency.clamp(MIN_FREQUENCY_HZ, max)
    }
}

/// Clamps a gain to ±24 dB. NaN maps to 0 dB.
#[inline]
pub fn clamp_gain(gain_db: f32) -> f32 {
    if gain_db.is_nan() {
        0.0
    } else {
        gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB)
    }
}

/// Clamps a quality factor to `[0.1, 18]`. NaN maps to 1.0.
#[inline]
pub fn clamp_q(q: f32) -> f32 {
    if q.is_nan() { 1.0 } else { q.clamp(MIN_Q, MAX_Q) }
}

/// The four peaking bands, in processing order (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Low band.
    Low,
    /// Low-mid band.
    LoMid,
    /// High-mid band.
    HiMid,
    /// High band.
    Hi,
}

impl Band {
    /// All bands in processing order.
    pub const ALL: [Band; 4] = [Band::Low, Band::LoMid, Band::HiMid, Band::Hi];

    /// Parameter holding this band's center frequency.
    pub const fn frequency_param(self) -> EqParam {
        match self {
            Band::Low => EqParam::LowFreq,
            Band::LoMid => EqParam::LoMidFreq,
            Band::HiMid => EqParam::HiMidFreq,
            Band::Hi => EqParam::HiFreq,
        }
    }

    /// Parameter holding this band's gain.
    pub const fn gain_param(self) -> EqParam {
        match self {
            Band::Low => EqParam::LowGain,
            Band::LoMid => EqParam::LoMidGain,
            Band::HiMid => EqParam::HiMidGain,
            Band::Hi => EqParam::HiGain,
        }
    }
}

/// Peaking-band coefficients (RBJ cookbook).
///
/// A band at exactly 0 dB is an exact identity section.
pub fn peak_coefficients(
    frequency: f32,
    gain_db: f32,
    q: f32,
    sample_rate: f32,
) -> BiquadCoefficients {
    let gain_db = clamp_gain(gain_db);
    if gain_db == 0.0 {
        return BiquadCoefficients::IDENTITY;
    }
    BiquadCoefficients::from_raw(peaking_eq_coefficients(
        clamp_frequency(frequency, sample_rate),
        clamp_q(q),
        gain_db,
        sample_rate,
    ))
}

/// Cut-filter steepness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Slope {
    /// 12 dB/octave (2nd order, one section).
    #[default]
    #[serde(rename = "12db")]
    Db12,
    /// 24 dB/octave (4th order, two sections).
    #[serde(rename = "24db")]
    Db24,
    /// 36 dB/octave (6th order, three sections).
    #[serde(rename = "36db")]
    Db36,
    /// 48 dB/octave (8th order, four sections).
    #[serde(rename = "48db")]
    Db48,
}

impl Slope {
    /// All slopes, gentlest first.
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Butterworth filter order.
    pub const fn order(self) -> usize {
        self.sections() * 2
    }

    /// Number of cascaded second-order sections.
    pub const fn sections(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }

    /// Asymptotic attenuation in dB per octave.
    pub const fn db_per_octave(self) -> u32 {
        self.sections() as u32 * 12
    }

    /// Per-section Q values realizing a Butterworth response.
    ///
    /// `Q_k = 1 / (2 cos(θ_k))` for the pole angles of the order-N prototype.
    pub const fn section_qs(self) -> &'static [f32] {
        match self {
            Slope::Db12 => &[0.70710678],
            Slope::Db24 => &[0.54119610, 1.30656296],
            Slope::Db36 => &[0.51763809, 0.70710678, 1.93185165],
            Slope::Db48 => &[0.50979558, 0.60134489, 0.89997622, 2.56291545],
        }
    }

    /// Config-file spelling (`"12db"` .. `"48db"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Slope::Db12 => "12db",
            Slope::Db24 => "24db",
            Slope::Db36 => "36db",
            Slope::Db48 => "48db",
        }
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB/oct", self.db_per_octave())
    }
}

impl FromStr for Slope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed.trim_end_matches("db/oct").trim_end_matches("db").trim();
        match digits {
            "12" => Ok(Slope::Db12),
            "24" => Ok(Slope::Db24),
            "36" => Ok(Slope::Db36),
            "48" => Ok(Slope::Db48),
            _ => Err(format!("invalid slope '{s}': expected 12db, 24db, 36db or 48db")),
        }
    }
}

/// High-pass or low-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutKind {
    /// Attenuates below the cutoff.
    HighPass,
    /// Attenuates above the cutoff.
    LowPass,
}

impl CutKind {
    /// `true` when `frequency` is at the pass-through extreme of the
    /// parameter range (HP at its minimum, LP at its maximum).
    pub fn is_bypassed_at(self, frequency: f32) -> bool {
        match self {
            CutKind::HighPass => frequency <= EqParam::HpFreq.descriptor().min,
            CutKind::LowPass => frequency >= EqParam::LpFreq.descriptor().max,
        }
    }
}

/// Coefficients for a Butterworth cut filter of up to eight poles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutDesign {
    sections: [BiquadCoefficients; MAX_CUT_SECTIONS],
    len: usize,
    bypassed: bool,
}

impl CutDesign {
    /// Designs a cut filter.
    ///
    /// A bypassed filter still reports `slope.sections()` sections, all of
    /// them identity, so the runtime filter keeps a coherent history and can
    /// leave bypass without a transient.
    pub fn new(kind: CutKind, frequency: f32, slope: Slope, sample_rate: f32) -> Self {
        let len = slope.sections();
        let mut sections = [BiquadCoefficients::IDENTITY; MAX_CUT_SECTIONS];
        let bypassed = kind.is_bypassed_at(frequency);
        if !bypassed {
            let frequency = clamp_frequency(frequency, sample_rate);
            for (section, &q) in sections.iter_mut().zip(slope.section_qs()) {
                let raw = match kind {
                    CutKind::HighPass => highpass_coefficients(frequency, q, sample_rate),
                    CutKind::LowPass => lowpass_coefficients(frequency, q, sample_rate),
                };
                *section = BiquadCoefficients::from_raw(raw);
            }
        }
        Self {
            sections,
            len,
            bypassed,
        }
    }

    /// The active sections, in cascade order.
    pub fn sections(&self) -> &[BiquadCoefficients] {
        &self.sections[..self.len]
    }

    /// `true` when every section is identity.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Linear magnitude of the cascade at `frequency`.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        if self.bypassed {
            return 1.0;
        }
        self.sections()
            .iter()
            .map(|c| c.magnitude_at(frequency, sample_rate))
            .product()
    }
}
