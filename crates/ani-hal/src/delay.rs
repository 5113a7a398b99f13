//! Blocking delay abstraction

use std::time::{Duration, Instant};

/// Blocking wait used for the settle time after a routing change.
///
/// Implementations may yield the thread but must not return before the
/// full duration has passed.
pub trait Delay: Send {
    /// Block for at least `duration`.
    fn delay(&mut self, duration: Duration);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

impl<T: Delay + ?Sized> Delay for Box<T> {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// Delay backed by the OS scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl StdDelay {
    /// Create a new delay
    pub fn new() -> Self {
        Self
    }
}

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        if duration.is_zero() {
            return;
        }

        // Sleep again on an early wakeup until the deadline has passed
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_delay_waits_full_duration() {
        let mut delay = StdDelay::new();
        let start = Instant::now();

        delay.delay(Duration::from_micros(500));

        assert!(start.elapsed() >= Duration::from_micros(500));
    }

    #[test]
    fn test_std_delay_zero_returns() {
        let mut delay = StdDelay;
        delay.delay(Duration::ZERO);
    }
}
