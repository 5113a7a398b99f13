//! Error types for the multiplexer

use ani_hal::{ChannelIndex, Quantity, SampleError, SelectorError};
use thiserror::Error;

/// Errors that can occur in the multiplexer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MuxError {
    /// Channel index outside the configured channel set
    #[error("invalid channel {channel}: device has {count} channel(s)")]
    InvalidChannel {
        /// Requested channel
        channel: ChannelIndex,
        /// Number of configured channels
        count: usize,
    },

    /// Routing command failed
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Parent channel failed to produce a value
    #[error("sample error: {0}")]
    Sample(#[from] SampleError),

    /// Channel does not advertise the requested quantity
    #[error("channel {channel} does not support {quantity} reads")]
    Unsupported {
        /// Requested channel
        channel: ChannelIndex,
        /// Requested quantity
        quantity: Quantity,
    },

    /// No selector supplied at construction
    #[error("mux selector not provided")]
    MissingSelector,

    /// No parent channel supplied at construction
    #[error("parent channel not provided")]
    MissingParent,

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking read task panicked before producing a result
    #[error("read aborted: {0}")]
    ReadAborted(String),

    /// The actor front-end is no longer running
    #[error("mux actor closed")]
    ActorClosed,
}
