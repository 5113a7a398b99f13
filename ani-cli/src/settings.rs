//! Device description file

use std::path::{Path, PathBuf};

use ani_hal::{GpioSelector, Scale};
use ani_mux::MuxConfig;
use ani_sim::SimBoardConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Device and simulated board loaded from `device.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Mux device configuration
    #[serde(default)]
    pub device: MuxConfig,
    /// Raw value presented on each board input
    #[serde(default = "default_inputs")]
    pub inputs: Vec<i32>,
    /// Scale reported by the simulated converter
    #[serde(default = "default_scale")]
    pub scale: Scale,
    /// Selector GPIO lines; 0 derives the count from `channel-count`
    #[serde(default)]
    pub selector_lines: u32,
}

fn default_inputs() -> Vec<i32> {
    SimBoardConfig::default().inputs
}

fn default_scale() -> Scale {
    SimBoardConfig::default().scale
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: MuxConfig::default(),
            inputs: default_inputs(),
            scale: default_scale(),
            selector_lines: 0,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for animux
    /// Uses $XDG_CONFIG_HOME/animux, falls back to ~/.config/animux
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("animux"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("animux"))
    }

    /// Get the default device file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("device.json"))
    }

    /// Load the device file at `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("invalid device file {}", path.display()))?;
        Ok(settings)
    }

    /// Load `path` if given, otherwise the default file, otherwise defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check that the board can back every configured channel
    pub fn validate(&self) -> Result<()> {
        self.device.validate()?;

        if self.inputs.len() < self.device.channel_count {
            bail!(
                "{} input(s) cannot back channel-count {}",
                self.inputs.len(),
                self.device.channel_count
            );
        }

        let lines = self.line_count()?;
        let addressable = 1u64.checked_shl(lines).unwrap_or(u64::MAX);
        if addressable < self.device.channel_count as u64 {
            bail!(
                "{} selector line(s) cannot address channel-count {}",
                lines,
                self.device.channel_count
            );
        }
        Ok(())
    }

    /// Selector lines to drive
    pub fn line_count(&self) -> Result<u32> {
        if self.selector_lines > 0 {
            return Ok(self.selector_lines);
        }
        let lines = GpioSelector::<ani_sim::SimPin>::lines_for(self.device.channel_count);
        u32::try_from(lines).context("selector line count out of range")
    }

    /// Board configuration matching this device
    pub fn board_config(&self) -> SimBoardConfig {
        SimBoardConfig {
            inputs: self.inputs.clone(),
            scale: self.scale,
            settle_time_us: self.device.settle_time_us,
        }
    }
}
