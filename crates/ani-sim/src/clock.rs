//! Simulation time source

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source shared by the simulated board and its delay.
///
/// A virtual clock only moves when a `SimDelay` waits on it, which makes
/// settle behaviour deterministic in tests. A wall clock follows real time
/// and is used together with a real delay.
#[derive(Debug, Clone)]
pub enum SimClock {
    /// Microseconds advanced explicitly
    Virtual(Arc<AtomicU64>),
    /// Real time since creation
    Wall(Instant),
}

impl SimClock {
    /// A virtual clock starting at zero
    pub fn virtual_clock() -> Self {
        SimClock::Virtual(Arc::new(AtomicU64::new(0)))
    }

    /// A clock following real time
    pub fn wall() -> Self {
        SimClock::Wall(Instant::now())
    }

    /// Time elapsed since the clock started
    pub fn now(&self) -> Duration {
        match self {
            SimClock::Virtual(us) => Duration::from_micros(us.load(Ordering::SeqCst)),
            SimClock::Wall(start) => start.elapsed(),
        }
    }

    /// Move a virtual clock forward; a wall clock advances on its own
    pub fn advance(&self, by: Duration) {
        if let SimClock::Virtual(us) = self {
            let micros = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
            us.fetch_add(micros, Ordering::SeqCst);
        }
    }

    /// Whether this is a virtual clock
    pub fn is_virtual(&self) -> bool {
        matches!(self, SimClock::Virtual(_))
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::virtual_clock()
    }
}
