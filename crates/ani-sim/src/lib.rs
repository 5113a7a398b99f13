//! Analog Mux Simulation Library
//!
//! This crate provides a simulated multiplexer board for exercising the
//! analog input multiplexer without physical hardware. It includes:
//!
//! - **SimBoard**: N inputs behind a mux feeding one converter, with a
//!   physical settle time, fault injection and counters
//! - **SimSelector** / **SimPin**: route the board by index or line by line
//! - **SimParentChannel**: the converter; samples taken before the routed
//!   signal settled return the previously routed input
//! - **SimDelay** / **SimClock**: settle waits on a virtual or wall clock
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ani_hal::{ChannelIndex, Delay, ParentChannel, Selector};
//! use ani_sim::SimBoard;
//!
//! let board = SimBoard::new(vec![100, 200]);
//! board.set_settle_time(Duration::from_micros(20));
//!
//! let mut selector = board.selector();
//! let mut parent = board.parent();
//! let mut delay = board.delay();
//!
//! selector.select(ChannelIndex(1)).unwrap();
//! delay.delay(Duration::from_micros(20));
//! assert_eq!(parent.read_raw().unwrap(), 200);
//! assert_eq!(board.stats().stale_samples, 0);
//! ```

pub mod board;
pub mod clock;
pub mod delay;
pub mod parent;
pub mod selector;

pub use board::{SimBoard, SimBoardConfig, SimStats};
pub use clock::SimClock;
pub use delay::SimDelay;
pub use parent::SimParentChannel;
pub use selector::{SimPin, SimSelector};
