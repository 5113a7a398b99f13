//! Analog Input Multiplexer
//!
//! This crate exposes several logical analog input channels that share one
//! physical conversion channel behind a hardware multiplexer.
//!
//! # Architecture
//!
//! A selector line decides which input is routed to the parent channel.
//! After every routing change the signal needs a settle time before a
//! sample can be trusted. The multiplexer therefore:
//!
//! - **Caches** the last routed channel and only switches on a change
//! - **Settles** for the configured delay after each switch, never otherwise
//! - **Serializes** every read of a device behind one lock
//! - **Bypasses** routing for scale reads, which belong to the parent channel
//!
//! `MuxChannelProxy` holds that logic. `ChannelRegistry` is the channel
//! table callers see, `MuxDevice` bundles both, and `MuxDeviceBuilder`
//! constructs a device from its hardware handles and `MuxConfig`. For async
//! callers, `actor` wraps a device in a single-task actor.
//!
//! # Example
//!
//! ```rust
//! use ani_hal::ChannelIndex;
//! use ani_mux::{MuxConfig, MuxDeviceBuilder};
//! use ani_sim::SimBoard;
//!
//! let board = SimBoard::new(vec![1200, 3400]);
//! let device = MuxDeviceBuilder::new(MuxConfig::new(50, 2))
//!     .selector(board.selector())
//!     .parent(board.parent())
//!     .delay(board.delay())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(device.read_raw(ChannelIndex(0)).unwrap(), 1200);
//! assert_eq!(device.read_raw(ChannelIndex(1)).unwrap(), 3400);
//! assert_eq!(board.stats().selects, 2);
//! ```

pub mod actor;
pub mod config;
pub mod device;
pub mod error;
pub mod proxy;
pub mod registry;

pub use actor::{run_mux_actor, spawn_mux_actor, MuxActorCommand, MuxClient};
pub use config::MuxConfig;
pub use device::{MuxDevice, MuxDeviceBuilder};
pub use error::MuxError;
pub use proxy::{MuxChannelProxy, MuxState};
pub use registry::{ChannelRegistry, LogicalChannelDescriptor};
