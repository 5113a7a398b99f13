//! GPIO output line abstraction.

use crate::error::SelectorError;

/// GPIO pin value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinValue {
    Low,
    High,
}

impl From<bool> for PinValue {
    fn from(value: bool) -> Self {
        if value {
            PinValue::High
        } else {
            PinValue::Low
        }
    }
}

impl From<PinValue> for bool {
    fn from(value: PinValue) -> Self {
        matches!(value, PinValue::High)
    }
}

/// A single GPIO output line.
///
/// Implementations may sleep; the new level must be committed before
/// `set` returns.
pub trait OutputPin: Send {
    /// Drive the line to `value`.
    fn set(&mut self, value: PinValue) -> Result<(), SelectorError>;
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set(&mut self, value: PinValue) -> Result<(), SelectorError> {
        (**self).set(value)
    }
}

impl<T: OutputPin + ?Sized> OutputPin for Box<T> {
    fn set(&mut self, value: PinValue) -> Result<(), SelectorError> {
        (**self).set(value)
    }
}
