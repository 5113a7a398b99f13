//! Device configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MuxError;

/// Default number of logical channels
pub const DEFAULT_CHANNEL_COUNT: usize = 2;

/// Multiplexer device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MuxConfig {
    /// Device name used in logs
    #[serde(default = "default_name")]
    pub name: String,
    /// Time to wait after switching before sampling (microseconds)
    #[serde(default)]
    pub settle_time_us: u32,
    /// Number of logical channels behind the mux
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,
}

fn default_name() -> String {
    "ani-mux".to_string()
}

fn default_channel_count() -> usize {
    DEFAULT_CHANNEL_COUNT
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            settle_time_us: 0,
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }
}

impl MuxConfig {
    /// Create a configuration with the given settle time and channel count
    pub fn new(settle_time_us: u32, channel_count: usize) -> Self {
        Self {
            settle_time_us,
            channel_count,
            ..Default::default()
        }
    }

    /// Settle delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_micros(u64::from(self.settle_time_us))
    }

    /// Check the configuration for values no device can use
    pub fn validate(&self) -> Result<(), MuxError> {
        if self.channel_count == 0 {
            return Err(MuxError::InvalidConfig(
                "channel-count must be at least 1".to_string(),
            ));
        }
        if u32::try_from(self.channel_count).is_err() {
            return Err(MuxError::InvalidConfig(format!(
                "channel-count {} exceeds the addressable range",
                self.channel_count
            )));
        }
        Ok(())
    }
}
