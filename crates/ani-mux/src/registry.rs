//! Logical channel registry
//!
//! The externally visible channel table of a device. Each entry names a
//! logical channel and the quantities it can answer; reads are forwarded to
//! the proxy with the entry's index.

use ani_hal::{ChannelIndex, ChannelType, Delay, ParentChannel, Quantity, Sample, Scale, Selector};
use serde::{Deserialize, Serialize};

use crate::error::MuxError;
use crate::proxy::MuxChannelProxy;

/// Description of one logical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalChannelDescriptor {
    /// Index passed to the selector
    pub index: ChannelIndex,
    /// Physical kind of the signal
    pub channel_type: ChannelType,
    /// Raw reads are answered per channel
    pub raw: bool,
    /// Scale reads are answered, shared by all channels of the same type
    pub scale: bool,
}

impl LogicalChannelDescriptor {
    /// Voltage channel answering both raw and scale reads
    pub fn voltage(index: u32) -> Self {
        Self {
            index: ChannelIndex(index),
            channel_type: ChannelType::Voltage,
            raw: true,
            scale: true,
        }
    }

    /// Whether this channel answers `quantity`
    pub fn supports(&self, quantity: Quantity) -> bool {
        match quantity {
            Quantity::Raw => self.raw,
            Quantity::Scale => self.scale,
        }
    }
}

/// Fixed, ordered channel table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelRegistry {
    descriptors: Vec<LogicalChannelDescriptor>,
}

impl ChannelRegistry {
    /// Create a registry from explicit descriptors
    pub fn new(descriptors: Vec<LogicalChannelDescriptor>) -> Self {
        Self { descriptors }
    }

    /// `count` voltage channels numbered from zero
    pub fn voltage(count: u32) -> Self {
        Self::new((0..count).map(LogicalChannelDescriptor::voltage).collect())
    }

    /// All descriptors in declaration order
    pub fn descriptors(&self) -> &[LogicalChannelDescriptor] {
        &self.descriptors
    }

    /// Look up the descriptor for `channel`
    pub fn get(&self, channel: ChannelIndex) -> Option<&LogicalChannelDescriptor> {
        self.descriptors.iter().find(|d| d.index == channel)
    }

    /// Number of logical channels
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Forward a read of `quantity` on `channel` to the proxy
    pub fn read<S, P, D>(
        &self,
        proxy: &MuxChannelProxy<S, P, D>,
        channel: ChannelIndex,
        quantity: Quantity,
    ) -> Result<Sample, MuxError>
    where
        S: Selector,
        P: ParentChannel,
        D: Delay,
    {
        let descriptor = self.resolve(channel, quantity, proxy.channel_count())?;
        proxy.read(descriptor.index, quantity)
    }

    /// Forward a raw read
    pub fn read_raw<S, P, D>(
        &self,
        proxy: &MuxChannelProxy<S, P, D>,
        channel: ChannelIndex,
    ) -> Result<i32, MuxError>
    where
        S: Selector,
        P: ParentChannel,
        D: Delay,
    {
        let descriptor = self.resolve(channel, Quantity::Raw, proxy.channel_count())?;
        proxy.read_raw(descriptor.index)
    }

    /// Forward a scale read
    pub fn read_scale<S, P, D>(
        &self,
        proxy: &MuxChannelProxy<S, P, D>,
        channel: ChannelIndex,
    ) -> Result<Scale, MuxError>
    where
        S: Selector,
        P: ParentChannel,
        D: Delay,
    {
        let descriptor = self.resolve(channel, Quantity::Scale, proxy.channel_count())?;
        proxy.read_scale(descriptor.index)
    }

    /// `count` is the proxy's channel count, so an unknown channel is
    /// reported the same way whichever layer rejects it
    fn resolve(
        &self,
        channel: ChannelIndex,
        quantity: Quantity,
        count: usize,
    ) -> Result<&LogicalChannelDescriptor, MuxError> {
        let descriptor = self
            .get(channel)
            .ok_or(MuxError::InvalidChannel { channel, count })?;
        if !descriptor.supports(quantity) {
            return Err(MuxError::Unsupported { channel, quantity });
        }
        Ok(descriptor)
    }
}
