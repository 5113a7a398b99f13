//! Selector abstraction and the GPIO-driven selector

use tracing::trace;

use crate::error::SelectorError;
use crate::gpio::{OutputPin, PinValue};
use crate::ChannelIndex;

/// Routes one input line to the shared conversion path.
///
/// `select` must commit the electrical state before returning and may
/// block while doing so. Selecting the already active index is not an
/// error.
pub trait Selector: Send {
    /// Route `index` to the parent channel.
    fn select(&mut self, index: ChannelIndex) -> Result<(), SelectorError>;
}

impl<T: Selector + ?Sized> Selector for &mut T {
    fn select(&mut self, index: ChannelIndex) -> Result<(), SelectorError> {
        (**self).select(index)
    }
}

impl<T: Selector + ?Sized> Selector for Box<T> {
    fn select(&mut self, index: ChannelIndex) -> Result<(), SelectorError> {
        (**self).select(index)
    }
}

/// Selector driven by one or more GPIO lines carrying the binary index.
///
/// Line `k` carries bit `k` of the index, so a single line routes two
/// inputs with line level equal to the channel number.
///
/// A select either commits every line or leaves the previously committed
/// routing in place: when line `k` fails, lines `0..k` are driven back to
/// their committed levels before the error is returned. If that is not
/// possible the error is `SelectorError::Indeterminate`.
#[derive(Debug)]
pub struct GpioSelector<P> {
    lines: Vec<P>,
    committed: Option<u32>,
}

impl<P: OutputPin> GpioSelector<P> {
    /// Create a selector over `lines`, least significant bit first
    pub fn new(lines: Vec<P>) -> Result<Self, SelectorError> {
        if lines.is_empty() {
            return Err(SelectorError::NoLines);
        }
        Ok(Self {
            lines,
            committed: None,
        })
    }

    /// Create a selector over a single line
    pub fn single(line: P) -> Self {
        Self {
            lines: vec![line],
            committed: None,
        }
    }

    /// Number of lines needed to address `channel_count` inputs
    pub fn lines_for(channel_count: usize) -> usize {
        let highest = channel_count.saturating_sub(1);
        ((usize::BITS - highest.leading_zeros()) as usize).max(1)
    }

    /// Number of output lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Highest index addressable with the configured lines
    pub fn max_index(&self) -> u32 {
        match u32::try_from(self.lines.len()) {
            Ok(n) if n < u32::BITS => (1u32 << n) - 1,
            _ => u32::MAX,
        }
    }

    /// Index the lines were last fully driven to, if known
    pub fn committed(&self) -> Option<u32> {
        self.committed
    }

    /// Release the underlying lines
    pub fn into_lines(self) -> Vec<P> {
        self.lines
    }

    /// Undo the writes to lines `0..failed` after line `failed` refused
    /// its new level
    fn roll_back(&mut self, failed: usize, cause: SelectorError) -> SelectorError {
        let reason = cause.to_string();
        if failed == 0 {
            return SelectorError::Line {
                line: failed,
                reason,
            };
        }

        let Some(committed) = self.committed else {
            return SelectorError::Indeterminate {
                line: failed,
                reason,
            };
        };

        for (bit, line) in self.lines.iter_mut().enumerate().take(failed) {
            if let Err(e) = line.set(level(committed, bit)) {
                self.committed = None;
                return SelectorError::Indeterminate {
                    line: failed,
                    reason: format!("{}; restoring line {} failed: {}", reason, bit, e),
                };
            }
        }

        SelectorError::Line {
            line: failed,
            reason,
        }
    }
}

/// Level of line `bit` when routing `index`
fn level(index: u32, bit: usize) -> PinValue {
    let shift = u32::try_from(bit).unwrap_or(u32::MAX);
    PinValue::from(index.checked_shr(shift).unwrap_or(0) & 1 == 1)
}

impl<P: OutputPin> Selector for GpioSelector<P> {
    fn select(&mut self, index: ChannelIndex) -> Result<(), SelectorError> {
        if index.0 > self.max_index() {
            return Err(SelectorError::OutOfRange {
                index: index.0,
                lines: self.lines.len(),
            });
        }

        let failure = self
            .lines
            .iter_mut()
            .enumerate()
            .find_map(|(bit, line)| line.set(level(index.0, bit)).err().map(|e| (bit, e)));
        if let Some((bit, e)) = failure {
            return Err(self.roll_back(bit, e));
        }

        self.committed = Some(index.0);
        trace!("Selector routed channel {}", index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingPin {
        writes: Vec<PinValue>,
        /// Refuse every write once this many have succeeded
        fail_after: Option<usize>,
    }

    impl RecordingPin {
        fn failing_after(writes: usize) -> Self {
            Self {
                fail_after: Some(writes),
                ..Default::default()
            }
        }
    }

    impl OutputPin for RecordingPin {
        fn set(&mut self, value: PinValue) -> Result<(), SelectorError> {
            if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
                return Err(SelectorError::Fault("stuck line".into()));
            }
            self.writes.push(value);
            Ok(())
        }
    }

    #[test]
    fn test_single_line_follows_index() {
        let mut sel = GpioSelector::single(RecordingPin::default());

        sel.select(ChannelIndex(1)).unwrap();
        sel.select(ChannelIndex(0)).unwrap();
        sel.select(ChannelIndex(0)).unwrap();

        let lines = sel.into_lines();
        assert_eq!(
            lines[0].writes,
            vec![PinValue::High, PinValue::Low, PinValue::Low]
        );
    }

    #[test]
    fn test_binary_encoding_over_lines() {
        let pins = (0..3).map(|_| RecordingPin::default()).collect();
        let mut sel = GpioSelector::new(pins).unwrap();

        sel.select(ChannelIndex(5)).unwrap();

        let lines = sel.into_lines();
        assert_eq!(lines[0].writes, vec![PinValue::High]);
        assert_eq!(lines[1].writes, vec![PinValue::Low]);
        assert_eq!(lines[2].writes, vec![PinValue::High]);
    }

    #[test]
    fn test_out_of_range_writes_nothing() {
        let mut sel = GpioSelector::single(RecordingPin::default());

        let err = sel.select(ChannelIndex(2)).unwrap_err();
        assert_eq!(err, SelectorError::OutOfRange { index: 2, lines: 1 });
        assert!(sel.into_lines()[0].writes.is_empty());
    }

    #[test]
    fn test_first_line_failure_reports_line() {
        let pins = vec![RecordingPin::failing_after(0), RecordingPin::default()];
        let mut sel = GpioSelector::new(pins).unwrap();

        let err = sel.select(ChannelIndex(3)).unwrap_err();
        assert!(matches!(err, SelectorError::Line { line: 0, .. }));
        assert_eq!(sel.committed(), None);
        assert!(sel.into_lines().iter().all(|p| p.writes.is_empty()));
    }

    #[test]
    fn test_partial_switch_restores_committed_levels() {
        let pins = vec![RecordingPin::default(), RecordingPin::failing_after(1)];
        let mut sel = GpioSelector::new(pins).unwrap();
        sel.select(ChannelIndex(0)).unwrap();

        // Line 0 goes high for index 3, then line 1 refuses
        let err = sel.select(ChannelIndex(3)).unwrap_err();
        assert!(matches!(err, SelectorError::Line { line: 1, .. }));
        assert_eq!(sel.committed(), Some(0));

        let lines = sel.into_lines();
        assert_eq!(
            lines[0].writes,
            vec![PinValue::Low, PinValue::High, PinValue::Low]
        );
        assert_eq!(lines[1].writes, vec![PinValue::Low]);
    }

    #[test]
    fn test_failed_restore_is_indeterminate() {
        let pins = vec![RecordingPin::failing_after(2), RecordingPin::failing_after(1)];
        let mut sel = GpioSelector::new(pins).unwrap();
        sel.select(ChannelIndex(0)).unwrap();

        let err = sel.select(ChannelIndex(3)).unwrap_err();
        assert!(matches!(err, SelectorError::Indeterminate { line: 1, .. }));
        assert_eq!(sel.committed(), None);
    }

    #[test]
    fn test_partial_switch_without_committed_routing_is_indeterminate() {
        let pins = vec![RecordingPin::default(), RecordingPin::failing_after(0)];
        let mut sel = GpioSelector::new(pins).unwrap();

        let err = sel.select(ChannelIndex(3)).unwrap_err();
        assert!(matches!(err, SelectorError::Indeterminate { line: 1, .. }));
    }

    #[test]
    fn test_empty_line_set_rejected() {
        let err = GpioSelector::<RecordingPin>::new(Vec::new()).unwrap_err();
        assert_eq!(err, SelectorError::NoLines);
    }

    #[test]
    fn test_lines_for_channel_count() {
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(1), 1);
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(2), 1);
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(3), 2);
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(4), 2);
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(5), 3);
        assert_eq!(GpioSelector::<RecordingPin>::lines_for(16), 4);
    }

    #[test]
    fn test_max_index() {
        let sel = GpioSelector::single(RecordingPin::default());
        assert_eq!(sel.max_index(), 1);

        let pins = (0..4).map(|_| RecordingPin::default()).collect();
        let sel = GpioSelector::new(pins).unwrap();
        assert_eq!(sel.max_index(), 15);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn line_levels_encode_index(line_count in 1usize..8, seed: u32) {
                let pins = (0..line_count).map(|_| RecordingPin::default()).collect();
                let mut sel = GpioSelector::new(pins).unwrap();
                let index = seed % (sel.max_index() + 1);

                sel.select(ChannelIndex(index)).unwrap();

                let decoded = sel
                    .into_lines()
                    .iter()
                    .enumerate()
                    .map(|(bit, pin)| u32::from(bool::from(pin.writes[0])) << bit)
                    .sum::<u32>();
                prop_assert_eq!(decoded, index);
            }
        }
    }
}
