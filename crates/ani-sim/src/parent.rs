//! Simulated converter behind the mux

use ani_hal::{ParentChannel, SampleError, Scale};

use crate::board::{lock, SharedBoard};
use crate::clock::SimClock;

/// Parent conversion channel of a `SimBoard`
#[derive(Debug, Clone)]
pub struct SimParentChannel {
    board: SharedBoard,
    clock: SimClock,
}

impl SimParentChannel {
    pub(crate) fn new(board: SharedBoard, clock: SimClock) -> Self {
        Self { board, clock }
    }
}

impl ParentChannel for SimParentChannel {
    fn read_raw(&mut self) -> Result<i32, SampleError> {
        let now = self.clock.now();
        lock(&self.board).convert(now)
    }

    fn read_scale(&mut self) -> Result<Scale, SampleError> {
        lock(&self.board).scale()
    }
}
