//! Analog Input Hardware Abstraction
//!
//! This crate provides the vocabulary shared by the multiplexer engine and
//! the hardware backends that drive it:
//!
//! - **Selector**: routes one of N input lines to the shared converter
//! - **ParentChannel**: the single physical conversion channel behind the mux
//! - **Delay**: blocking wait used for settle time after a routing change
//!
//! # Sample types
//!
//! A read produces either a raw converter value or a two-component scale.
//! Scale values are passed through untouched; `ScaleKind` only records how
//! the two integers are meant to be combined.
//!
//! # Example
//!
//! ```rust
//! use ani_hal::{ChannelIndex, Quantity, Sample, Scale, ScaleKind};
//!
//! let channel = ChannelIndex(1);
//! let scale = Scale::fractional(3300, 4096);
//!
//! assert_eq!(channel.as_usize(), 1);
//! assert_eq!(Sample::Scale(scale).quantity(), Quantity::Scale);
//! assert_eq!(scale.kind, ScaleKind::Fractional);
//! assert_eq!(scale.to_string(), "3300/4096");
//! ```

pub mod delay;
pub mod error;
pub mod gpio;
pub mod parent;
pub mod selector;

use std::fmt;

pub use delay::{Delay, StdDelay};
pub use error::{SampleError, SelectorError};
pub use gpio::{OutputPin, PinValue};
pub use parent::ParentChannel;
pub use selector::{GpioSelector, Selector};

/// Index of a logical channel behind the multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelIndex(pub u32);

impl ChannelIndex {
    /// Get the raw index value
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Get the index as a `usize` for table lookups
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ChannelIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity requested from a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    /// Unscaled converter output
    Raw,
    /// Scale factor of the parent channel
    Scale,
}

impl Quantity {
    /// Returns a short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Raw => "raw",
            Quantity::Scale => "scale",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical kind of a logical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelType {
    /// Voltage input
    #[default]
    Voltage,
}

/// How the two components of a [`Scale`] combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleKind {
    /// `value` alone; `value2` is unused
    Int,
    /// `value + value2 / 1_000_000`
    IntPlusMicro,
    /// `value + value2 / 1_000_000_000`
    IntPlusNano,
    /// `value / value2`
    Fractional,
    /// `value / 2^value2`
    FractionalLog2,
}

/// Two-component scale reported by a parent channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    /// First component (integer part or numerator)
    pub value: i32,
    /// Second component (fractional part, denominator or shift)
    pub value2: i32,
    /// Interpretation of the pair
    pub kind: ScaleKind,
}

impl Scale {
    /// Create a scale from its parts
    pub fn new(value: i32, value2: i32, kind: ScaleKind) -> Self {
        Self {
            value,
            value2,
            kind,
        }
    }

    /// Integer scale
    pub fn int(value: i32) -> Self {
        Self::new(value, 0, ScaleKind::Int)
    }

    /// `numerator / denominator` scale
    pub fn fractional(numerator: i32, denominator: i32) -> Self {
        Self::new(numerator, denominator, ScaleKind::Fractional)
    }

    /// `numerator / 2^shift` scale
    pub fn fractional_log2(numerator: i32, shift: i32) -> Self {
        Self::new(numerator, shift, ScaleKind::FractionalLog2)
    }

    /// `integer + micros / 1e6` scale
    pub fn int_plus_micro(integer: i32, micros: i32) -> Self {
        Self::new(integer, micros, ScaleKind::IntPlusMicro)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScaleKind::Int => write!(f, "{}", self.value),
            ScaleKind::IntPlusMicro => fmt_fixed(f, self.value, self.value2, 6),
            ScaleKind::IntPlusNano => fmt_fixed(f, self.value, self.value2, 9),
            ScaleKind::Fractional => write!(f, "{}/{}", self.value, self.value2),
            ScaleKind::FractionalLog2 => write!(f, "{}>>{}", self.value, self.value2),
        }
    }
}

/// Fixed-point rendering of `integer.fraction`; a negative fraction with a
/// zero integer part still prints the sign.
fn fmt_fixed(
    f: &mut fmt::Formatter<'_>,
    integer: i32,
    fraction: i32,
    digits: usize,
) -> fmt::Result {
    let sign = if integer == 0 && fraction < 0 { "-" } else { "" };
    write!(
        f,
        "{}{}.{:0width$}",
        sign,
        integer,
        fraction.unsigned_abs(),
        width = digits
    )
}

/// Result of a single channel read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sample {
    /// Raw converter value
    Raw(i32),
    /// Parent channel scale
    Scale(Scale),
}

impl Sample {
    /// Quantity this sample answers
    pub fn quantity(&self) -> Quantity {
        match self {
            Sample::Raw(_) => Quantity::Raw,
            Sample::Scale(_) => Quantity::Scale,
        }
    }

    /// The raw value, if this is a raw sample
    pub fn as_raw(&self) -> Option<i32> {
        match self {
            Sample::Raw(value) => Some(*value),
            Sample::Scale(_) => None,
        }
    }

    /// The scale, if this is a scale sample
    pub fn as_scale(&self) -> Option<Scale> {
        match self {
            Sample::Raw(_) => None,
            Sample::Scale(scale) => Some(*scale),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Raw(value) => write!(f, "{}", value),
            Sample::Scale(scale) => write!(f, "{}", scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_display() {
        assert_eq!(Scale::int(2).to_string(), "2");
        assert_eq!(Scale::int_plus_micro(0, 805_664).to_string(), "0.805664");
        assert_eq!(Scale::int_plus_micro(1, 5).to_string(), "1.000005");
        assert_eq!(Scale::int_plus_micro(0, -250_000).to_string(), "-0.250000");
        assert_eq!(
            Scale::new(0, 1_500, ScaleKind::IntPlusNano).to_string(),
            "0.000001500"
        );
        assert_eq!(Scale::fractional(3300, 4096).to_string(), "3300/4096");
        assert_eq!(Scale::fractional_log2(3300, 12).to_string(), "3300>>12");
    }

    #[test]
    fn test_sample_accessors() {
        let raw = Sample::Raw(1234);
        assert_eq!(raw.quantity(), Quantity::Raw);
        assert_eq!(raw.as_raw(), Some(1234));
        assert_eq!(raw.as_scale(), None);

        let scale = Sample::Scale(Scale::fractional(1, 2));
        assert_eq!(scale.quantity(), Quantity::Scale);
        assert_eq!(scale.as_raw(), None);
        assert_eq!(scale.as_scale(), Some(Scale::fractional(1, 2)));
    }

    #[test]
    fn test_channel_index_conversions() {
        let idx = ChannelIndex::from(3);
        assert_eq!(idx.as_u32(), 3);
        assert_eq!(idx.as_usize(), 3);
        assert_eq!(idx.to_string(), "3");
        assert!(ChannelIndex(0) < ChannelIndex(1));
    }

    #[test]
    fn test_quantity_names() {
        assert_eq!(Quantity::Raw.to_string(), "raw");
        assert_eq!(Quantity::Scale.to_string(), "scale");
    }
}
