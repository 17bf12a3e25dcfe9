//! Parameter introspection for discoverable, host-automatable parameters.
//!
//! The [`ParameterInfo`] trait and [`ParamDescriptor`] give hosts, command
//! line tools, and tests a uniform view of a processor's parameters:
//! names, ranges, defaults, units, stable ids, and normalization curves.
//!
//! Parameters are accessed by index. Each carries:
//!
//! - [`ParamId`] - stable numeric ID for automation and persistence
//! - [`ParamScale`] - normalization curve (linear or logarithmic)
//! - `string_id` - human-readable stable ID (e.g. `"hi_freq"`)
//!
//! # Example
//!
//! ```rust
//! use peq_core::{ParameterInfo, ParamDescriptor, ParamId};
//!
//! struct Trim {
//!     gain_db: f32,
//! }
//!
//! impl ParameterInfo for Trim {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         match index {
//!             0 => Some(ParamDescriptor::gain_db("Trim", "Trim", -24.0, 24.0, 0.0)
//!                 .with_id(ParamId(1), "trim")),
//!             _ => None,
//!         }
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         match index {
//!             0 => self.gain_db,
//!             _ => 0.0,
//!         }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if index == 0 {
//!             self.gain_db = value.clamp(-24.0, 24.0);
//!         }
//!     }
//! }
//! ```

/// Scaling curve for parameter normalization.
///
/// Determines how a parameter's plain value maps to normalized \[0.0, 1.0\] space.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// Linear mapping (default). Equal resolution across the range.
    #[default]
    Linear,
    /// Logarithmic mapping. More resolution at low values.
    /// Suited to frequency parameters. Requires `min > 0.0`.
    Logarithmic,
}

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` must never change for a given parameter;
/// hosts record automation against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Trait for processors that expose introspectable parameters.
///
/// # Parameter Indexing
///
/// Parameters are accessed by zero-based index. The index must be stable for
/// the lifetime of the instance. Use [`param_count`](Self::param_count)
/// to determine valid indices.
pub trait ParameterInfo {
    /// Returns the number of parameters exposed.
    ///
    /// Valid parameter indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Returns the descriptor for the parameter at the given index.
    ///
    /// Returns `None` if `index >= param_count()`.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Gets the current value of the parameter at the given index.
    ///
    /// Returns `0.0` if `index >= param_count()`.
    fn get_param(&self, index: usize) -> f32;

    /// Sets the value of the parameter at the given index.
    ///
    /// Implementations clamp the value to the descriptor's range.
    /// Out-of-bounds indices are ignored.
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a parameter index by name (case-insensitive).
    ///
    /// Matches against [`ParamDescriptor::name`],
    /// [`ParamDescriptor::short_name`] and [`ParamDescriptor::string_id`].
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        for i in 0..self.param_count() {
            if let Some(desc) = self.param_info(i)
                && (desc.name.eq_ignore_ascii_case(name)
                    || desc.short_name.eq_ignore_ascii_case(name)
                    || desc.string_id.eq_ignore_ascii_case(name))
            {
                return Some(i);
            }
        }
        None
    }

    /// Finds a parameter index by its stable [`ParamId`].
    ///
    /// Scans all parameters (O(n)) - suitable for setup paths, not audio.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}

/// Describes a single parameter's metadata for display and validation.
///
/// # Example
///
/// ```rust
/// use peq_core::{ParamDescriptor, ParamId};
///
/// let cutoff = ParamDescriptor::frequency_hz("HP Freq", "HP", 25.0, 2750.0, 25.0)
///     .with_id(ParamId(104), "hp_freq");
///
/// assert_eq!(cutoff.clamp(10.0), 25.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "HI-MID Freq").
    pub name: &'static str,

    /// Short name for narrow displays, max 8 characters.
    pub short_name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum allowed value for this parameter.
    pub min: f32,

    /// Maximum allowed value for this parameter.
    pub max: f32,

    /// Default value when the processor is initialized.
    pub default: f32,

    /// Recommended step increment (1 Hz for frequencies, 0.5 dB for gains).
    pub step: f32,

    /// Stable numeric ID for host automation.
    ///
    /// Default: `ParamId(0)` (unassigned).
    pub id: ParamId,

    /// Human-readable stable ID for serialization and command lines.
    ///
    /// Default: `""` (unassigned).
    pub string_id: &'static str,

    /// Normalization curve for mapping between plain and normalized values.
    pub scale: ParamScale,
}

impl ParamDescriptor {
    /// Frequency parameter in Hz with logarithmic normalization.
    ///
    /// Normalized values map to equal frequency ratios, not equal Hz steps.
    pub fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Hertz,
            min,
            max,
            default,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Logarithmic,
        }
    }

    /// Gain parameter with custom name and range (decibels).
    pub fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Decibels,
            min,
            max,
            default,
            step: 0.5,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
        }
    }

    /// Sets the stable parameter ID and string ID.
    ///
    /// Builder pattern - call after a factory method or struct literal.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// NaN maps to the default value.
    ///
    /// ```rust
    /// use peq_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -24.0);
    /// assert_eq!(desc.clamp(f32::NAN), 0.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Converts a plain value to normalized range (0.0 to 1.0).
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return (value - self.min) / range;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// Converts a normalized value (0.0 to 1.0) to the actual parameter range.
    ///
    /// Inverse of [`normalize`](Self::normalize). Input is clamped to \[0, 1\].
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min + normalized * (self.max - self.min);
                }
                self.clamp(self.min * libm::powf(self.max / self.min, normalized))
            }
        }
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - for band gains.
    Decibels,

    /// Hertz (Hz) - for band centers and cut-off frequencies.
    Hertz,

    /// No unit - for dimensionless parameters.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use peq_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::None => "",
        }
    }
}
