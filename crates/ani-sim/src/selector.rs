//! Simulated selector and selector lines

use ani_hal::{ChannelIndex, OutputPin, PinValue, Selector, SelectorError};

use crate::board::{lock, SharedBoard};
use crate::clock::SimClock;

/// Selector that sets the routed line of a `SimBoard` in one step
#[derive(Debug, Clone)]
pub struct SimSelector {
    board: SharedBoard,
    clock: SimClock,
}

impl SimSelector {
    pub(crate) fn new(board: SharedBoard, clock: SimClock) -> Self {
        Self { board, clock }
    }
}

impl Selector for SimSelector {
    fn select(&mut self, index: ChannelIndex) -> Result<(), SelectorError> {
        let now = self.clock.now();
        let mut board = lock(&self.board);

        if let Some(err) = board.take_select_failure() {
            return Err(err);
        }
        if index.as_usize() >= board.input_count() {
            return Err(SelectorError::Fault(format!("no input line {}", index)));
        }

        board.set_levels(index.as_u32(), now);
        board.record_select(index.as_u32());
        Ok(())
    }
}

/// One GPIO line of the board's selector
///
/// Drive the board through `ani_hal::GpioSelector<SimPin>` to exercise the
/// line-by-line routing path.
#[derive(Debug, Clone)]
pub struct SimPin {
    board: SharedBoard,
    clock: SimClock,
    bit: u32,
}

impl SimPin {
    pub(crate) fn new(board: SharedBoard, clock: SimClock, bit: u32) -> Self {
        Self { board, clock, bit }
    }
}

impl OutputPin for SimPin {
    fn set(&mut self, value: PinValue) -> Result<(), SelectorError> {
        let now = self.clock.now();
        let mut board = lock(&self.board);

        if let Some(err) = board
            .take_select_failure()
            .or_else(|| board.take_line_failure(self.bit))
        {
            return Err(err);
        }

        let mask = 1u32.checked_shl(self.bit).unwrap_or(0);
        let levels = if bool::from(value) {
            board.line_levels() | mask
        } else {
            board.line_levels() & !mask
        };
        board.record_line_write();
        board.set_levels(levels, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimBoard;
    use ani_hal::{GpioSelector, ParentChannel};

    #[test]
    fn test_gpio_selector_over_sim_pins() {
        let board = SimBoard::new(vec![10, 20, 30, 40]);
        let mut selector = GpioSelector::new(board.pins(2)).unwrap();
        let mut parent = board.parent();

        selector.select(ChannelIndex(3)).unwrap();
        assert_eq!(board.routed(), 3);
        assert_eq!(parent.read_raw().unwrap(), 40);

        selector.select(ChannelIndex(2)).unwrap();
        assert_eq!(board.routed(), 2);
        assert_eq!(parent.read_raw().unwrap(), 30);

        assert_eq!(board.stats().line_writes, 4);
    }

    #[test]
    fn test_line_fault_hits_only_that_line() {
        let board = SimBoard::new(vec![10, 20, 30, 40]);
        let mut selector = GpioSelector::new(board.pins(2)).unwrap();
        selector.select(ChannelIndex(0)).unwrap();

        board.fail_line(1, 1);
        assert!(selector.select(ChannelIndex(3)).is_err());
        // Line 0 was driven back low after line 1 refused
        assert_eq!(board.routed(), 0);
        assert_eq!(board.stats().failed_selects, 1);

        selector.select(ChannelIndex(3)).unwrap();
        assert_eq!(board.routed(), 3);
    }

    #[test]
    fn test_select_unknown_line_fails() {
        let board = SimBoard::new(vec![10, 20]);
        let mut selector = board.selector();

        assert!(selector.select(ChannelIndex(2)).is_err());
        assert_eq!(board.routed(), 0);
        assert_eq!(board.stats().selects, 0);
    }
}
