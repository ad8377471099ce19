use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use attitude::{CUBE_VIEW_AXIS_LENGTH, DEFAULT_AXIS_LENGTH, DEFAULT_CAPACITY, DEFAULT_CUBE_HALF_WIDTH};
use log::info;
use serde::{Deserialize, Serialize};
use telemetry::{MonitorConfig, DEFAULT_SENSOR_BLOCK, DEFAULT_SLOPE_THRESHOLD};

use crate::cli::Args;

/// What the main panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Rotated reference axes
    Axes,
    /// Rotated reference axes and a solid cube
    #[default]
    Cube,
    /// Auto-scaling chart of the single-value feed
    Scalar,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "axes" => Ok(View::Axes),
            "cube" => Ok(View::Cube),
            "scalar" => Ok(View::Scalar),
            other => bail!("Unknown view {:?}, expected axes, cube or scalar", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Serial device, e.g. `/dev/ttyUSB0` or `COM4`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Serial read timeout; also bounds how long shutdown waits for the link thread
    pub read_timeout_ms: u64,
    /// Name of the sensor object in JSON lines
    pub sensor_block: String,
    /// Samples kept for the time-series charts
    pub history_capacity: usize,
    pub view: View,
    /// Length of the drawn axes. Defaults depend on the view when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_length: Option<f64>,
    pub cube_half_width: f64,
    /// Delay between redraws
    pub refresh_ms: u64,
    /// Slope classification threshold for the single-value feed, in degrees
    pub slope_threshold_deg: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            read_timeout_ms: 1000,
            sensor_block: DEFAULT_SENSOR_BLOCK.to_string(),
            history_capacity: DEFAULT_CAPACITY,
            view: View::default(),
            axis_length: None,
            cube_half_width: DEFAULT_CUBE_HALF_WIDTH,
            refresh_ms: 50,
            slope_threshold_deg: DEFAULT_SLOPE_THRESHOLD,
        }
    }
}

impl ViewerConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            bail!("history_capacity must be at least 1");
        }
        if self.baud_rate == 0 {
            bail!("baud_rate must be positive");
        }
        if self.read_timeout_ms == 0 {
            bail!("read_timeout_ms must be at least 1");
        }
        if self.refresh_ms == 0 {
            bail!("refresh_ms must be at least 1");
        }
        if !(self.cube_half_width > 0.0) {
            bail!("cube_half_width must be positive, got {}", self.cube_half_width);
        }
        if let Some(length) = self.axis_length {
            if !(length > 0.0) {
                bail!("axis_length must be positive, got {}", length);
            }
        }
        Ok(())
    }

    /// Command line flags win over the file
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = &args.port {
            self.port = Some(port.clone());
        }
        if let Some(baud) = args.baud {
            self.baud_rate = baud;
        }
        if let Some(view) = args.view {
            self.view = view;
        }
    }

    pub fn axis_length(&self) -> f64 {
        match (self.axis_length, self.view) {
            (Some(length), _) => length,
            (None, View::Cube) => CUBE_VIEW_AXIS_LENGTH,
            (None, _) => DEFAULT_AXIS_LENGTH,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            sensor_block: self.sensor_block.clone(),
            history_capacity: self.history_capacity,
            slope_threshold: self.slope_threshold_deg,
        }
    }
}
