//! Multiplexed channel proxy
//!
//! The proxy owns the selector, the parent channel and the settle delay of
//! one device. It remembers which input was routed last so the selector is
//! only touched, and the settle delay only paid, when a raw read asks for a
//! different input. Scale reads go straight to the parent channel.
//!
//! All reads of a device pass through a single mutex, so a switch, its
//! settle wait and the sample that follows are never interleaved with
//! another read.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ani_hal::{ChannelIndex, Delay, ParentChannel, Quantity, Sample, Scale, Selector, SelectorError};

use crate::error::MuxError;

/// Routing state of one multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxState {
    /// Last channel the selector was successfully commanded to
    pub selected_channel: Option<ChannelIndex>,
    /// Wait applied after every routing change
    pub settle_delay: Duration,
}

impl MuxState {
    /// Fresh state; nothing is known to be routed yet
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            selected_channel: None,
            settle_delay,
        }
    }

    /// Whether a raw read of `channel` needs a routing change first
    pub fn needs_switch(&self, channel: ChannelIndex) -> bool {
        self.selected_channel != Some(channel)
    }
}

struct ProxyInner<S, P, D> {
    selector: S,
    parent: P,
    delay: D,
    state: MuxState,
}

impl<S: Selector, P: ParentChannel, D: Delay> ProxyInner<S, P, D> {
    /// Route `channel` and let it settle, unless it is already routed.
    /// The cache is only updated once the selector has committed, and is
    /// dropped when the selector reports the routing as unknown.
    fn route(&mut self, channel: ChannelIndex) -> Result<(), MuxError> {
        if !self.state.needs_switch(channel) {
            return Ok(());
        }

        if let Err(e) = self.selector.select(channel) {
            if matches!(e, SelectorError::Indeterminate { .. }) {
                self.state.selected_channel = None;
            }
            return Err(e.into());
        }
        self.delay.delay(self.state.settle_delay);
        self.state.selected_channel = Some(channel);
        Ok(())
    }
}

/// Serialized access to one physical channel shared by N logical channels
pub struct MuxChannelProxy<S, P, D> {
    channel_count: usize,
    inner: Mutex<ProxyInner<S, P, D>>,
}

impl<S, P, D> std::fmt::Debug for MuxChannelProxy<S, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxChannelProxy")
            .field("channel_count", &self.channel_count)
            .field("inner", &"<locked>")
            .finish()
    }
}

impl<S, P, D> MuxChannelProxy<S, P, D>
where
    S: Selector,
    P: ParentChannel,
    D: Delay,
{
    /// Create a proxy for `channel_count` logical channels
    pub fn new(
        selector: S,
        parent: P,
        delay: D,
        settle_delay: Duration,
        channel_count: usize,
    ) -> Self {
        Self {
            channel_count,
            inner: Mutex::new(ProxyInner {
                selector,
                parent,
                delay,
                state: MuxState::new(settle_delay),
            }),
        }
    }

    /// Number of logical channels
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Configured settle delay
    pub fn settle_delay(&self) -> Duration {
        self.lock().state.settle_delay
    }

    /// Read `quantity` from logical channel `channel`.
    ///
    /// A raw read of a channel other than the one routed last commands the
    /// selector and waits the full settle delay before sampling. A failed
    /// selector command leaves the routing cache untouched and no sample
    /// is taken. Scale reads never touch the selector.
    pub fn read(&self, channel: ChannelIndex, quantity: Quantity) -> Result<Sample, MuxError> {
        self.check_channel(channel)?;

        let mut inner = self.lock();
        match quantity {
            Quantity::Raw => {
                inner.route(channel)?;
                Ok(Sample::Raw(inner.parent.read_raw()?))
            }
            Quantity::Scale => Ok(Sample::Scale(inner.parent.read_scale()?)),
        }
    }

    /// Read a raw value from `channel`
    pub fn read_raw(&self, channel: ChannelIndex) -> Result<i32, MuxError> {
        self.check_channel(channel)?;

        let mut inner = self.lock();
        inner.route(channel)?;
        Ok(inner.parent.read_raw()?)
    }

    /// Read the parent scale on behalf of `channel`
    pub fn read_scale(&self, channel: ChannelIndex) -> Result<Scale, MuxError> {
        self.check_channel(channel)?;

        Ok(self.lock().parent.read_scale()?)
    }

    fn check_channel(&self, channel: ChannelIndex) -> Result<(), MuxError> {
        if channel.as_usize() >= self.channel_count {
            return Err(MuxError::InvalidChannel {
                channel,
                count: self.channel_count,
            });
        }
        Ok(())
    }

    // The cache only changes after a committed switch, so a guard poisoned
    // by a panicking backend still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, ProxyInner<S, P, D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> MuxState {
        self.lock().state
    }
}
