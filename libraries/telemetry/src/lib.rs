//! # Telemetry
//!
//! Line-oriented input for the tilt viewer: where lines come from
//! ([`LineSource`]), what they mean ([`parse_line`]) and how they update the
//! sample histories ([`Monitor`]).
//!
//! ## Wire format
//!
//! One sample per line, either
//!
//! - a JSON object with a sensor block:
//!   `{"MPU9250": {"accel": {..}, "gyro": {..}, "mag": {..}, "roll": r, "pitch": p, "yaw": y}}`
//! - a bare number (legacy single-value feed), or
//! - the sentinel `END`, which separates frames and is ignored.

pub mod error;
pub mod frame;
pub mod monitor;
pub mod source;

pub use error::{TelemetryError, TelemetryResult};
pub use frame::{parse_line, Axes, Frame, ImuReading, DEFAULT_SENSOR_BLOCK, END_SENTINEL};
pub use monitor::{Monitor, MonitorConfig, Slope, Tick, DEFAULT_SLOPE_THRESHOLD};
#[cfg(feature = "serial")]
pub use source::SerialSource;
pub use source::{LineSource, ReaderSource};
