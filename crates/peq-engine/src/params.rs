//! The ten host parameters in layout order.
//!
//! Indices, [`ParamId`]s and string ids are stable: hosts record automation
//! against them, and the command line refers to parameters by string id.
//! Frequencies come first (high band downwards, then the cut filters),
//! followed by the four band gains.

use peq_core::{ParamDescriptor, ParamId};

/// Base of the stable numeric parameter ids.
const ID_BASE: u32 = 100;

/// One of the ten automatable equalizer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqParam {
    /// High band center frequency.
    HiFreq,
    /// High-mid band center frequency.
    HiMidFreq,
    /// Low-mid band center frequency.
    LoMidFreq,
    /// Low band center frequency.
    LowFreq,
    /// High-pass cutoff.
    HpFreq,
    /// Low-pass cutoff.
    LpFreq,
    /// High band gain.
    HiGain,
    /// High-mid band gain.
    HiMidGain,
    /// Low-mid band gain.
    LoMidGain,
    /// Low band gain.
    LowGain,
}

impl EqParam {
    /// Number of parameters.
    pub const COUNT: usize = 10;

    /// Every parameter in layout order.
    pub const ALL: [EqParam; Self::COUNT] = [
        EqParam::HiFreq,
        EqParam::HiMidFreq,
        EqParam::LoMidFreq,
        EqParam::LowFreq,
        EqParam::HpFreq,
        EqParam::LpFreq,
        EqParam::HiGain,
        EqParam::HiMidGain,
        EqParam::LoMidGain,
        EqParam::LowGain,
    ];

    /// Zero-based layout index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameter at a layout index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable numeric id (`100..=109`).
    pub const fn id(self) -> ParamId {
        ParamId(ID_BASE + self as u32)
    }

    /// Parameter with the given stable id.
    pub fn from_id(id: ParamId) -> Option<Self> {
        id.0.checked_sub(ID_BASE)
            .and_then(|i| Self::from_index(i as usize))
    }

    /// Stable string id, used by the command line and config files.
    pub const fn string_id(self) -> &'static str {
        match self {
            EqParam::HiFreq => "hi_freq",
            EqParam::HiMidFreq => "hi_mid_freq",
            EqParam::LoMidFreq => "lo_mid_freq",
            EqParam::LowFreq => "low_freq",
            EqParam::HpFreq => "hp_freq",
            EqParam::LpFreq => "lp_freq",
            EqParam::HiGain => "hi_gain",
            EqParam::HiMidGain => "hi_mid_gain",
            EqParam::LoMidGain => "lo_mid_gain",
            EqParam::LowGain => "low_gain",
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            EqParam::HiFreq => "HI Freq",
            EqParam::HiMidFreq => "HI-MID Freq",
            EqParam::LoMidFreq => "LO-MID Freq",
            EqParam::LowFreq => "LOW Freq",
            EqParam::HpFreq => "HP Freq",
            EqParam::LpFreq => "LP Freq",
            EqParam::HiGain => "HI Gain",
            EqParam::HiMidGain => "HI-MID Gain",
            EqParam::LoMidGain => "LO-MID Gain",
            EqParam::LowGain => "LOW Gain",
        }
    }

    const fn short_name(self) -> &'static str {
        match self {
            EqParam::HiFreq => "HI F",
            EqParam::HiMidFreq => "HM F",
            EqParam::LoMidFreq => "LM F",
            EqParam::LowFreq => "LO F",
            EqParam::HpFreq => "HP",
            EqParam::LpFreq => "LP",
            EqParam::HiGain => "HI G",
            EqParam::HiMidGain => "HM G",
            EqParam::LoMidGain => "LM G",
            EqParam::LowGain => "LO G",
        }
    }

    /// `true` for the six frequency parameters.
    pub const fn is_frequency(self) -> bool {
        (self as usize) < 6
    }

    /// Full descriptor: range, default, step, unit and ids.
    ///
    /// Frequencies normalize logarithmically, so a normalized 0.5 is the
    /// geometric midpoint of the range rather than the arithmetic one.
    /// Gains normalize linearly.
    pub fn descriptor(self) -> ParamDescriptor {
        let (min, max, default) = match self {
            EqParam::HiFreq => (800.0, 16000.0, 800.0),
            EqParam::HiMidFreq => (400.0, 8000.0, 400.0),
            EqParam::LoMidFreq => (200.0, 4000.0, 200.0),
            EqParam::LowFreq => (40.0, 800.0, 40.0),
            EqParam::HpFreq => (25.0, 2750.0, 25.0),
            EqParam::LpFreq => (160.0, 20000.0, 20000.0),
            EqParam::HiGain | EqParam::HiMidGain | EqParam::LoMidGain | EqParam::LowGain => {
                (-24.0, 24.0, 0.0)
            }
        };
        let desc = if self.is_frequency() {
            ParamDescriptor::frequency_hz(self.name(), self.short_name(), min, max, default)
        } else {
            ParamDescriptor::gain_db(self.name(), self.short_name(), min, max, default)
        };
        desc.with_id(self.id(), self.string_id())
    }

    /// Finds a parameter by display name, short name or string id
    /// (case-insensitive). Dashes and underscores are interchangeable in
    /// string ids, so `hi-mid-freq` finds [`EqParam::HiMidFreq`].
    pub fn find(name: &str) -> Option<Self> {
        let normalized = name.replace('-', "_");
        Self::ALL.into_iter().find(|p| {
            p.name().eq_ignore_ascii_case(name)
                || p.short_name().eq_ignore_ascii_case(name)
                || p.string_id().eq_ignore_ascii_case(&normalized)
        })
    }
}

impl core::fmt::Display for EqParam {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
