//! Error types for selector and parent channel operations

use thiserror::Error;

/// Errors raised while routing an input through the selector
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Index cannot be represented on the available selector lines
    #[error("channel {index} out of range for {lines} selector line(s)")]
    OutOfRange { index: u32, lines: usize },

    /// Selector was configured without any output line
    #[error("selector has no output lines")]
    NoLines,

    /// Writing one of the selector lines failed
    #[error("selector line {line} failed: {reason}")]
    Line { line: usize, reason: String },

    /// A line failed and the previously committed routing could not be
    /// restored; the routed input is unknown
    #[error("selector line {line} failed, routing unknown: {reason}")]
    Indeterminate { line: usize, reason: String },

    /// Other hardware or transport fault
    #[error("selector fault: {0}")]
    Fault(String),
}

/// Errors raised by the parent conversion channel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// Conversion did not complete in time
    #[error("conversion timeout after {0}ms")]
    Timeout(u64),

    /// Hardware or transport fault
    #[error("sample fault: {0}")]
    Fault(String),
}
