//! Read requests given on the command line

use std::fmt;
use std::str::FromStr;

use ani_hal::{ChannelIndex, Quantity};

/// One `--read` argument: `raw:N` or `scale:N`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub quantity: Quantity,
    pub channel: ChannelIndex,
}

impl FromStr for ReadRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once(':')
            .ok_or_else(|| format!("expected raw:N or scale:N, got '{}'", s))?;

        let quantity = match kind.trim() {
            "raw" => Quantity::Raw,
            "scale" => Quantity::Scale,
            other => return Err(format!("unknown quantity '{}'", other)),
        };
        let channel = index
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid channel '{}': {}", index, e))?;

        Ok(Self {
            quantity,
            channel: ChannelIndex(channel),
        })
    }
}

impl fmt::Display for ReadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.quantity, self.channel)
    }
}
