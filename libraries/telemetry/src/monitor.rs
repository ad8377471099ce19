use core::fmt;

use attitude::{Orientation, RotationMatrix, SampleHistory, ScalarHistory, DEFAULT_CAPACITY};
use log::{debug, info, warn};

use crate::error::{TelemetryError, TelemetryResult};
use crate::frame::{parse_line, Axes, Frame, ImuReading, DEFAULT_SENSOR_BLOCK};

/// Pitch above which the legacy single-value feed counts as uphill
pub const DEFAULT_SLOPE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Name of the sensor object in JSON lines
    pub sensor_block: String,
    /// Samples kept for the time-series charts
    pub history_capacity: usize,
    /// Slope classification threshold in degrees
    pub slope_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor_block: DEFAULT_SENSOR_BLOCK.to_string(),
            history_capacity: DEFAULT_CAPACITY,
            slope_threshold: DEFAULT_SLOPE_THRESHOLD,
        }
    }
}

/// Incline reported by the legacy single-value feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Uphill,
    Downhill,
    Flat,
}

impl Slope {
    pub fn classify(pitch: f64, threshold: f64) -> Self {
        if pitch > threshold {
            Slope::Uphill
        } else if pitch < -threshold {
            Slope::Downhill
        } else {
            Slope::Flat
        }
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slope::Uphill => write!(f, "uphill"),
            Slope::Downhill => write!(f, "downhill"),
            Slope::Flat => write!(f, "flat"),
        }
    }
}

/// Result of feeding one line to the [`Monitor`]
#[derive(Debug)]
pub enum Tick {
    /// Frame delimiter, nothing changed
    Ignored,
    /// Structured sample appended to the orientation history
    Orientation {
        orientation: Orientation,
        rotation: RotationMatrix,
        reading: ImuReading,
        /// Fields that were absent and defaulted, or unusable and dropped
        warnings: Vec<TelemetryError>,
    },
    /// Single value appended to the scalar history
    Scalar { value: f64, slope: Slope },
}

/// Body of the read-parse-update loop.
///
/// Owns both histories; nothing else mutates them.
pub struct Monitor {
    config: MonitorConfig,
    history: SampleHistory,
    scalars: ScalarHistory,
    last_reading: Option<ImuReading>,
    accepted: u64,
    rejected: u64,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            history: SampleHistory::new(config.history_capacity),
            scalars: ScalarHistory::prefilled(config.history_capacity, 0.0),
            config,
            last_reading: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Parse a line and apply it to the histories.
    ///
    /// Errors are per line: the histories are left untouched and the caller
    /// can carry on with the next line.
    pub fn process_line(&mut self, line: &str) -> TelemetryResult<Tick> {
        match parse_line(line, &self.config.sensor_block) {
            Ok(frame) => Ok(self.apply(frame)),
            Err(e) => {
                self.rejected += 1;
                Err(e)
            }
        }
    }

    pub fn apply(&mut self, frame: Frame) -> Tick {
        match frame {
            Frame::Delimiter => Tick::Ignored,
            Frame::Reading(reading) => {
                let orientation = reading.orientation();
                let warnings = reading.warnings();
                for warning in &warnings {
                    match warning {
                        TelemetryError::MissingField { .. } => debug!("{}", warning),
                        _ => warn!("{}", warning),
                    }
                }
                log_reading(&reading, &orientation);

                self.history.push(orientation);
                self.last_reading = Some(reading.clone());
                self.accepted += 1;

                Tick::Orientation {
                    orientation,
                    rotation: orientation.rotation_matrix(),
                    reading,
                    warnings,
                }
            }
            Frame::Scalar(value) => {
                let slope = Slope::classify(value, self.config.slope_threshold);
                info!("Tilt {:.2}° -> {}", value, slope);

                self.scalars.push(value);
                self.accepted += 1;
                Tick::Scalar { value, slope }
            }
        }
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn scalars(&self) -> &ScalarHistory {
        &self.scalars
    }

    pub fn last_reading(&self) -> Option<&ImuReading> {
        self.last_reading.as_ref()
    }

    /// Lines that produced a sample
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Lines skipped because they could not be parsed
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

fn log_reading(reading: &ImuReading, orientation: &Orientation) {
    let vectors = [("Accel", reading.accel), ("Gyro", reading.gyro), ("Mag", reading.mag)];
    for (name, axes) in vectors {
        if let Some(Axes { x, y, z }) = axes {
            debug!("{:<5} : x={:.3}, y={:.3}, z={:.3}", name, x, y, z);
        }
    }
    info!(
        "Roll={:.2}°, Pitch={:.2}°, Yaw={:.2}°",
        orientation.roll, orientation.pitch, orientation.yaw
    );
}
