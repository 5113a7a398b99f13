//! Multiplexer device and probe
//!
//! A `MuxDevice` bundles the channel table with the proxy that serializes
//! access to the shared conversion path. Devices are built through
//! `MuxDeviceBuilder`, which takes the selector and parent channel handed
//! over by the surrounding platform together with the device configuration.
//!
//! # Example
//!
//! ```rust
//! use ani_hal::{ChannelIndex, Quantity};
//! use ani_mux::{MuxConfig, MuxDeviceBuilder};
//! use ani_sim::SimBoard;
//!
//! let board = SimBoard::new(vec![100, 200]);
//! let device = MuxDeviceBuilder::new(MuxConfig::new(50, 2))
//!     .selector(board.selector())
//!     .parent(board.parent())
//!     .delay(board.delay())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(device.read_raw(ChannelIndex(1)).unwrap(), 200);
//! assert!(device.read(ChannelIndex(0), Quantity::Scale).is_ok());
//! ```

use std::time::Duration;

use ani_hal::{ChannelIndex, Delay, ParentChannel, Quantity, Sample, Scale, Selector, StdDelay};
use tracing::{debug, info, warn};

use crate::config::MuxConfig;
use crate::error::MuxError;
use crate::proxy::MuxChannelProxy;
use crate::registry::{ChannelRegistry, LogicalChannelDescriptor};

/// A constructed multiplexer device
pub struct MuxDevice<S, P, D> {
    name: String,
    registry: ChannelRegistry,
    proxy: MuxChannelProxy<S, P, D>,
}

impl<S, P, D> std::fmt::Debug for MuxDevice<S, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxDevice")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl<S, P, D> MuxDevice<S, P, D>
where
    S: Selector,
    P: ParentChannel,
    D: Delay,
{
    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical channels exposed by this device
    pub fn channels(&self) -> &[LogicalChannelDescriptor] {
        self.registry.descriptors()
    }

    /// The channel table
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// The underlying proxy
    pub fn proxy(&self) -> &MuxChannelProxy<S, P, D> {
        &self.proxy
    }

    /// Configured settle delay
    pub fn settle_delay(&self) -> Duration {
        self.proxy.settle_delay()
    }

    /// Read `quantity` from `channel`
    pub fn read(&self, channel: ChannelIndex, quantity: Quantity) -> Result<Sample, MuxError> {
        self.registry.read(&self.proxy, channel, quantity)
    }

    /// Read a raw value from `channel`
    pub fn read_raw(&self, channel: ChannelIndex) -> Result<i32, MuxError> {
        self.registry.read_raw(&self.proxy, channel)
    }

    /// Read the scale reported for `channel`
    pub fn read_scale(&self, channel: ChannelIndex) -> Result<Scale, MuxError> {
        self.registry.read_scale(&self.proxy, channel)
    }
}

/// Builds a `MuxDevice` from its hardware handles and configuration
pub struct MuxDeviceBuilder<S, P, D = StdDelay> {
    config: MuxConfig,
    selector: Option<S>,
    parent: Option<P>,
    delay: D,
    registry: Option<ChannelRegistry>,
}

impl<S, P> MuxDeviceBuilder<S, P, StdDelay> {
    /// Start a builder; the settle wait defaults to `StdDelay`
    pub fn new(config: MuxConfig) -> Self {
        Self {
            config,
            selector: None,
            parent: None,
            delay: StdDelay,
            registry: None,
        }
    }
}

impl<S, P, D> MuxDeviceBuilder<S, P, D> {
    /// Selector driving the mux control lines
    pub fn selector(mut self, selector: S) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Parent conversion channel
    pub fn parent(mut self, parent: P) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Replace the settle wait implementation
    pub fn delay<D2>(self, delay: D2) -> MuxDeviceBuilder<S, P, D2> {
        MuxDeviceBuilder {
            config: self.config,
            selector: self.selector,
            parent: self.parent,
            delay,
            registry: self.registry,
        }
    }

    /// Use an explicit channel table instead of `channel-count` voltage channels
    pub fn channels(mut self, registry: ChannelRegistry) -> Self {
        self.registry = Some(registry);
        self
    }
}

impl<S, P, D> MuxDeviceBuilder<S, P, D>
where
    S: Selector,
    P: ParentChannel,
    D: Delay,
{
    /// Validate the configuration and construct the device
    pub fn build(self) -> Result<MuxDevice<S, P, D>, MuxError> {
        let config = self.config;
        config.validate()?;

        let Some(selector) = self.selector else {
            warn!("{}: failed to get mux selector", config.name);
            return Err(MuxError::MissingSelector);
        };
        let Some(parent) = self.parent else {
            warn!("{}: failed to get parent channel", config.name);
            return Err(MuxError::MissingParent);
        };

        let registry = match self.registry {
            Some(registry) => registry,
            None => ChannelRegistry::voltage(channel_count_u32(&config)?),
        };
        if let Some(d) = registry
            .descriptors()
            .iter()
            .find(|d| d.index.as_usize() >= config.channel_count)
        {
            return Err(MuxError::InvalidConfig(format!(
                "channel {} outside channel-count {}",
                d.index, config.channel_count
            )));
        }

        debug!("{}: settle-time-us: {}", config.name, config.settle_time_us);

        let proxy = MuxChannelProxy::new(
            selector,
            parent,
            self.delay,
            config.settle_delay(),
            config.channel_count,
        );

        info!(
            "Registered mux device {} with {} channel(s)",
            config.name,
            registry.len()
        );

        Ok(MuxDevice {
            name: config.name,
            registry,
            proxy,
        })
    }
}

fn channel_count_u32(config: &MuxConfig) -> Result<u32, MuxError> {
    u32::try_from(config.channel_count).map_err(|_| {
        MuxError::InvalidConfig(format!(
            "channel-count {} exceeds the addressable range",
            config.channel_count
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ani_sim::{SimBoard, SimDelay, SimParentChannel, SimSelector};

    #[test]
    fn test_missing_selector_is_fatal() {
        let board = SimBoard::new(vec![1, 2]);
        let result = MuxDeviceBuilder::<SimSelector, SimParentChannel>::new(MuxConfig::default())
            .parent(board.parent())
            .build();

        assert!(matches!(result, Err(MuxError::MissingSelector)));
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let board = SimBoard::new(vec![1, 2]);
        let result = MuxDeviceBuilder::<SimSelector, SimParentChannel>::new(MuxConfig::default())
            .selector(board.selector())
            .build();

        assert!(matches!(result, Err(MuxError::MissingParent)));
    }

    #[test]
    fn test_zero_channel_count_rejected() {
        let board = SimBoard::new(vec![1]);
        let result = MuxDeviceBuilder::new(MuxConfig::new(0, 0))
            .selector(board.selector())
            .parent(board.parent())
            .delay(board.delay())
            .build();

        assert!(matches!(result, Err(MuxError::InvalidConfig(_))));
    }

    #[test]
    fn test_registry_outside_channel_count_rejected() {
        let board = SimBoard::new(vec![1, 2]);
        let result = MuxDeviceBuilder::new(MuxConfig::new(0, 2))
            .selector(board.selector())
            .parent(board.parent())
            .delay(board.delay())
            .channels(ChannelRegistry::voltage(3))
            .build();

        assert!(matches!(result, Err(MuxError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_layout_follows_channel_count() {
        let board = SimBoard::new(vec![1, 2, 3, 4]);
        let device = MuxDeviceBuilder::new(MuxConfig::new(10, 4))
            .selector(board.selector())
            .parent(board.parent())
            .delay(board.delay())
            .build()
            .unwrap();

        assert_eq!(device.channels().len(), 4);
        assert_eq!(device.name(), "ani-mux");
        assert_eq!(device.settle_delay(), Duration::from_micros(10));
    }

    #[test]
    fn test_sparse_registry_reports_channel_count() {
        let board = SimBoard::new(vec![1, 2, 3, 4]);
        let registry = ChannelRegistry::new(vec![
            LogicalChannelDescriptor::voltage(0),
            LogicalChannelDescriptor::voltage(2),
        ]);
        let device = MuxDeviceBuilder::new(MuxConfig::new(10, 4))
            .selector(board.selector())
            .parent(board.parent())
            .delay(board.delay())
            .channels(registry)
            .build()
            .unwrap();

        // Unlisted but in range, and out of range, report the same count
        for index in [1, 7] {
            let err = device.read_raw(ChannelIndex(index)).unwrap_err();
            assert_eq!(
                err,
                MuxError::InvalidChannel {
                    channel: ChannelIndex(index),
                    count: 4
                }
            );
        }
        assert_eq!(device.read_raw(ChannelIndex(2)).unwrap(), 3);
        assert_eq!(board.stats().select_history, vec![2]);
    }

    #[test]
    fn test_unsupported_quantity_skips_hardware() {
        let board = SimBoard::new(vec![1, 2]);
        let registry = ChannelRegistry::new(vec![
            LogicalChannelDescriptor::voltage(0),
            LogicalChannelDescriptor {
                scale: false,
                ..LogicalChannelDescriptor::voltage(1)
            },
        ]);
        let device = MuxDeviceBuilder::new(MuxConfig::new(10, 2))
            .selector(board.selector())
            .parent(board.parent())
            .delay(SimDelay::new(board.clock()))
            .channels(registry)
            .build()
            .unwrap();

        let err = device.read_scale(ChannelIndex(1)).unwrap_err();
        assert_eq!(
            err,
            MuxError::Unsupported {
                channel: ChannelIndex(1),
                quantity: Quantity::Scale
            }
        );
        assert_eq!(board.stats().scale_reads, 0);
        assert!(device.read_scale(ChannelIndex(0)).is_ok());
    }
}
