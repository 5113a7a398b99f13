//! Simulated settle wait

use std::time::Duration;

use ani_hal::Delay;

use crate::board::{lock, SharedBoard};
use crate::clock::SimClock;

/// Delay that advances a simulation clock instead of sleeping.
///
/// On a wall clock the wait is real, so the simulated signal settles the
/// same way it would on hardware.
#[derive(Debug, Clone)]
pub struct SimDelay {
    clock: SimClock,
    board: Option<SharedBoard>,
}

impl SimDelay {
    /// Delay on `clock` that records nothing
    pub fn new(clock: SimClock) -> Self {
        Self { clock, board: None }
    }

    pub(crate) fn for_board(clock: SimClock, board: SharedBoard) -> Self {
        Self {
            clock,
            board: Some(board),
        }
    }
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: Duration) {
        if let Some(board) = &self.board {
            lock(board).record_wait(duration);
        }

        if self.clock.is_virtual() {
            self.clock.advance(duration);
        } else if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
