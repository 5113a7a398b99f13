//! Simulated multiplexer board
//!
//! Models N analog inputs behind a mux whose output feeds one converter.
//! The routed line follows the selector line levels; after each routing
//! change the converter keeps seeing the previously routed signal until the
//! physical settle time has elapsed on the board clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ani_hal::{SampleError, Scale, SelectorError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::SimClock;
use crate::delay::SimDelay;
use crate::parent::SimParentChannel;
use crate::selector::{SimPin, SimSelector};

/// Configuration for creating a simulated board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimBoardConfig {
    /// Raw value presented by each input line
    pub inputs: Vec<i32>,
    /// Scale reported by the converter
    pub scale: Scale,
    /// Time the routed signal needs before it can be sampled (microseconds)
    #[serde(default)]
    pub settle_time_us: u32,
}

impl Default for SimBoardConfig {
    fn default() -> Self {
        Self {
            inputs: vec![1241, 2482],
            scale: default_scale(),
            settle_time_us: 0,
        }
    }
}

/// 12-bit converter on a 3.3V reference
fn default_scale() -> Scale {
    Scale::fractional(3300, 4096)
}

/// Counters collected by the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Successful selector commands
    pub selects: usize,
    /// Selector commands or line writes that failed
    pub failed_selects: usize,
    /// Routing changes actually performed
    pub switches: usize,
    /// Individual selector line writes
    pub line_writes: usize,
    /// Raw conversions performed
    pub raw_reads: usize,
    /// Scale queries answered
    pub scale_reads: usize,
    /// Raw conversions taken before the signal settled
    pub stale_samples: usize,
    /// Every wait performed through the board's delay
    pub waits: Vec<Duration>,
    /// Index passed to every successful selector command
    pub select_history: Vec<u32>,
}

#[derive(Debug)]
pub(crate) struct BoardState {
    inputs: Vec<i32>,
    scale: Scale,
    settle_time: Duration,
    line_levels: u32,
    routed: u32,
    previous: Option<u32>,
    switched_at: Option<Duration>,
    fail_selects: usize,
    line_faults: HashMap<u32, usize>,
    fail_raw: usize,
    fail_scale: usize,
    stats: SimStats,
}

impl BoardState {
    /// Apply new selector line levels at time `now`
    pub(crate) fn set_levels(&mut self, levels: u32, now: Duration) {
        self.line_levels = levels;
        if levels != self.routed {
            self.previous = Some(self.routed);
            self.routed = levels;
            self.switched_at = Some(now);
            self.stats.switches += 1;
            debug!("Sim mux routed line {}", levels);
        }
    }

    pub(crate) fn line_levels(&self) -> u32 {
        self.line_levels
    }

    pub(crate) fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub(crate) fn take_select_failure(&mut self) -> Option<SelectorError> {
        if self.fail_selects == 0 {
            return None;
        }
        self.fail_selects -= 1;
        self.stats.failed_selects += 1;
        Some(SelectorError::Fault("simulated selector fault".to_string()))
    }

    pub(crate) fn take_line_failure(&mut self, bit: u32) -> Option<SelectorError> {
        let remaining = self.line_faults.get_mut(&bit).filter(|n| **n > 0)?;
        *remaining -= 1;
        self.stats.failed_selects += 1;
        Some(SelectorError::Fault(format!("simulated fault on line {}", bit)))
    }

    pub(crate) fn record_select(&mut self, index: u32) {
        self.stats.selects += 1;
        self.stats.select_history.push(index);
    }

    pub(crate) fn record_line_write(&mut self) {
        self.stats.line_writes += 1;
    }

    pub(crate) fn record_wait(&mut self, duration: Duration) {
        self.stats.waits.push(duration);
    }

    /// Convert whatever reaches the converter at time `now`
    pub(crate) fn convert(&mut self, now: Duration) -> Result<i32, SampleError> {
        if self.fail_raw > 0 {
            self.fail_raw -= 1;
            return Err(SampleError::Timeout(10));
        }
        self.stats.raw_reads += 1;

        let settled = self
            .switched_at
            .map_or(true, |at| now.saturating_sub(at) >= self.settle_time);
        let line = if settled {
            self.routed
        } else {
            self.stats.stale_samples += 1;
            self.previous.unwrap_or(self.routed)
        };

        self.inputs
            .get(line as usize)
            .copied()
            .ok_or_else(|| SampleError::Fault(format!("no input on line {}", line)))
    }

    pub(crate) fn scale(&mut self) -> Result<Scale, SampleError> {
        if self.fail_scale > 0 {
            self.fail_scale -= 1;
            return Err(SampleError::Fault("simulated scale fault".to_string()));
        }
        self.stats.scale_reads += 1;
        Ok(self.scale)
    }
}

pub(crate) type SharedBoard = Arc<Mutex<BoardState>>;

pub(crate) fn lock(board: &SharedBoard) -> MutexGuard<'_, BoardState> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A simulated mux board with N inputs
///
/// All handles produced by a board share its state, so tests can inspect
/// counters and inject faults while a device owns the selector and parent.
#[derive(Debug, Clone)]
pub struct SimBoard {
    state: SharedBoard,
    clock: SimClock,
}

impl SimBoard {
    /// Create a board on a virtual clock with the default scale
    pub fn new(inputs: Vec<i32>) -> Self {
        Self::from_config(
            SimBoardConfig {
                inputs,
                ..Default::default()
            },
            SimClock::virtual_clock(),
        )
    }

    /// Create a board from configuration on the given clock
    pub fn from_config(config: SimBoardConfig, clock: SimClock) -> Self {
        // Power-on routing is line 0 with all selector lines low
        let state = BoardState {
            inputs: config.inputs,
            scale: config.scale,
            settle_time: Duration::from_micros(u64::from(config.settle_time_us)),
            line_levels: 0,
            routed: 0,
            previous: None,
            switched_at: None,
            fail_selects: 0,
            line_faults: HashMap::new(),
            fail_raw: 0,
            fail_scale: 0,
            stats: SimStats::default(),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
        }
    }

    /// Selector commanding the board directly by index
    pub fn selector(&self) -> SimSelector {
        SimSelector::new(self.state.clone(), self.clock.clone())
    }

    /// One selector line; line `bit` carries bit `bit` of the routed index
    pub fn pin(&self, bit: u32) -> SimPin {
        SimPin::new(self.state.clone(), self.clock.clone(), bit)
    }

    /// `count` selector lines, least significant first
    pub fn pins(&self, count: u32) -> Vec<SimPin> {
        (0..count).map(|bit| self.pin(bit)).collect()
    }

    /// The converter behind the mux
    pub fn parent(&self) -> SimParentChannel {
        SimParentChannel::new(self.state.clone(), self.clock.clone())
    }

    /// Delay advancing the board clock and recording every wait
    pub fn delay(&self) -> SimDelay {
        SimDelay::for_board(self.clock.clone(), self.state.clone())
    }

    /// The board clock
    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    /// Currently routed line
    pub fn routed(&self) -> u32 {
        lock(&self.state).routed
    }

    /// Snapshot of the board counters
    pub fn stats(&self) -> SimStats {
        lock(&self.state).stats.clone()
    }

    /// Reset all counters
    pub fn reset_stats(&self) {
        lock(&self.state).stats = SimStats::default();
    }

    /// Change the value presented on `line`
    pub fn set_input(&self, line: usize, value: i32) {
        if let Some(input) = lock(&self.state).inputs.get_mut(line) {
            *input = value;
        }
    }

    /// Change the physical settle time
    pub fn set_settle_time(&self, settle_time: Duration) {
        lock(&self.state).settle_time = settle_time;
    }

    /// Make the next `count` selector commands or line writes fail
    pub fn fail_next_selects(&self, count: usize) {
        lock(&self.state).fail_selects = count;
    }

    /// Make the next `count` writes to selector line `bit` fail
    pub fn fail_line(&self, bit: u32, count: usize) {
        lock(&self.state).line_faults.insert(bit, count);
    }

    /// Make the next `count` raw conversions fail
    pub fn fail_next_raw_reads(&self, count: usize) {
        lock(&self.state).fail_raw = count;
    }

    /// Make the next `count` scale queries fail
    pub fn fail_next_scale_reads(&self, count: usize) {
        lock(&self.state).fail_scale = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ani_hal::{ChannelIndex, Delay, ParentChannel, Selector};

    #[test]
    fn test_power_on_routes_line_zero() {
        let board = SimBoard::new(vec![10, 20]);
        let mut parent = board.parent();

        assert_eq!(board.routed(), 0);
        assert_eq!(parent.read_raw().unwrap(), 10);
        assert_eq!(board.stats().stale_samples, 0);
    }

    #[test]
    fn test_sample_before_settle_is_stale() {
        let board = SimBoard::new(vec![10, 20]);
        board.set_settle_time(Duration::from_micros(50));
        let mut selector = board.selector();
        let mut parent = board.parent();
        let mut delay = board.delay();

        selector.select(ChannelIndex(1)).unwrap();
        assert_eq!(parent.read_raw().unwrap(), 10);

        delay.delay(Duration::from_micros(50));
        assert_eq!(parent.read_raw().unwrap(), 20);

        let stats = board.stats();
        assert_eq!(stats.stale_samples, 1);
        assert_eq!(stats.switches, 1);
        assert_eq!(stats.waits, vec![Duration::from_micros(50)]);
    }

    #[test]
    fn test_reselecting_same_line_is_not_a_switch() {
        let board = SimBoard::new(vec![10, 20]);
        let mut selector = board.selector();

        selector.select(ChannelIndex(0)).unwrap();
        selector.select(ChannelIndex(0)).unwrap();

        let stats = board.stats();
        assert_eq!(stats.selects, 2);
        assert_eq!(stats.switches, 0);
    }

    #[test]
    fn test_injected_faults() {
        let board = SimBoard::new(vec![10, 20]);
        let mut selector = board.selector();
        let mut parent = board.parent();

        board.fail_next_selects(1);
        assert!(selector.select(ChannelIndex(1)).is_err());
        assert_eq!(board.routed(), 0);
        assert!(selector.select(ChannelIndex(1)).is_ok());

        board.fail_next_raw_reads(1);
        assert_eq!(parent.read_raw(), Err(SampleError::Timeout(10)));
        assert_eq!(parent.read_raw(), Ok(20));

        board.fail_next_scale_reads(1);
        assert!(parent.read_scale().is_err());
        assert_eq!(parent.read_scale(), Ok(Scale::fractional(3300, 4096)));

        let stats = board.stats();
        assert_eq!(stats.failed_selects, 1);
        assert_eq!(stats.raw_reads, 1);
        assert_eq!(stats.scale_reads, 1);
    }

    #[test]
    fn test_config_deserialize() {
        let json = r#"{
            "inputs": [1, 2, 3],
            "scale": { "value": 1, "value2": 500000, "kind": "IntPlusMicro" },
            "settle-time-us": 20
        }"#;
        let config: SimBoardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.inputs, vec![1, 2, 3]);
        assert_eq!(config.scale, Scale::int_plus_micro(1, 500_000));
        assert_eq!(config.settle_time_us, 20);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn settled_samples_follow_routing(
                lines in prop::collection::vec(0u32..4, 1..20),
                settle_us in 0u64..200
            ) {
                let board = SimBoard::new(vec![100, 200, 300, 400]);
                board.set_settle_time(Duration::from_micros(settle_us));
                let mut selector = board.selector();
                let mut parent = board.parent();
                let mut delay = board.delay();

                for &line in &lines {
                    selector.select(ChannelIndex(line)).unwrap();
                    delay.delay(Duration::from_micros(settle_us));
                    let value = parent.read_raw().unwrap();
                    prop_assert_eq!(value, (line as i32 + 1) * 100);
                }
                prop_assert_eq!(board.stats().stale_samples, 0);
            }
        }
    }
}
