use attitude::Orientation;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{TelemetryError, TelemetryResult};

/// Line the firmware sends between frames
pub const END_SENTINEL: &str = "END";

/// Name of the sensor object in the JSON payload
pub const DEFAULT_SENSOR_BLOCK: &str = "MPU9250";

/// Three-axis sensor value (`{"x": .., "y": .., "z": ..}`)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Decoded sensor block of a JSON line.
///
/// Every field is optional on the wire. Absent angles are treated as 0 by
/// [`ImuReading::orientation`]; vectors that do not decode as [`Axes`] are
/// dropped and listed in `dropped_vectors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImuReading {
    /// Accelerometer
    pub accel: Option<Axes>,
    /// Gyroscope
    pub gyro: Option<Axes>,
    /// Magnetometer
    pub mag: Option<Axes>,
    /// Roll in degrees
    pub roll: Option<f64>,
    /// Pitch in degrees
    pub pitch: Option<f64>,
    /// Yaw in degrees
    pub yaw: Option<f64>,
    /// Whether the named sensor block was present in the line
    pub block_present: bool,
    /// Vectors present on the wire but unusable, with the decoder message
    pub dropped_vectors: Vec<(&'static str, String)>,
}

/// Wire form of the sensor block; vectors are decoded one by one afterwards
#[derive(Deserialize)]
struct SensorBlock {
    accel: Option<Value>,
    gyro: Option<Value>,
    mag: Option<Value>,
    roll: Option<f64>,
    pitch: Option<f64>,
    yaw: Option<f64>,
}

impl ImuReading {
    pub fn orientation(&self) -> Orientation {
        Orientation::new(
            self.roll.unwrap_or(0.0),
            self.pitch.unwrap_or(0.0),
            self.yaw.unwrap_or(0.0),
        )
    }

    /// Names of the angles that were absent and defaulted to 0
    pub fn missing_angles(&self) -> Vec<&'static str> {
        [("roll", self.roll), ("pitch", self.pitch), ("yaw", self.yaw)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Missing angles as [`TelemetryError::MissingField`] warnings
    pub fn missing_fields(&self) -> Vec<TelemetryError> {
        self.missing_angles()
            .into_iter()
            .map(|field| TelemetryError::MissingField { field })
            .collect()
    }

    /// Everything defaulted or dropped while decoding the sample
    pub fn warnings(&self) -> Vec<TelemetryError> {
        let mut warnings = self.missing_fields();
        warnings.extend(self.dropped_vectors.iter().map(|(field, reason)| {
            TelemetryError::unexpected_shape(format!("{} dropped: {}", field, reason))
        }));
        warnings
    }
}

/// One parsed telemetry line
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Frame separator, carries no data
    Delimiter,
    /// Bare number from the legacy single-value protocol
    Scalar(f64),
    /// Structured JSON sample
    Reading(ImuReading),
}

/// Decode one line of telemetry.
///
/// Accepts the `END` sentinel, a JSON object holding `sensor_block`, or a
/// single number (JSON or a plain float literal such as `nan`).
pub fn parse_line(line: &str, sensor_block: &str) -> TelemetryResult<Frame> {
    let line = line.trim();
    if line == END_SENTINEL {
        return Ok(Frame::Delimiter);
    }
    if line.is_empty() {
        return Err(TelemetryError::malformed("empty line"));
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(mut payload)) => parse_reading(payload.remove(sensor_block)),
        Ok(Value::Number(number)) => number
            .as_f64()
            .map(Frame::Scalar)
            .ok_or_else(|| TelemetryError::unexpected_shape(format!("number {} out of range", number))),
        Ok(other) => Err(TelemetryError::unexpected_shape(format!(
            "expected an object or a number, found {}",
            value_kind(&other)
        ))),
        Err(err) => line
            .parse::<f64>()
            .map(Frame::Scalar)
            .map_err(|_| TelemetryError::malformed(err.to_string())),
    }
}

fn parse_reading(block: Option<Value>) -> TelemetryResult<Frame> {
    match block {
        None => Ok(Frame::Reading(ImuReading::default())),
        Some(block @ Value::Object(_)) => {
            let block: SensorBlock = serde_json::from_value(block)
                .map_err(|e| TelemetryError::unexpected_shape(e.to_string()))?;
            let mut dropped_vectors = Vec::new();
            let mut vector = |name: &'static str, raw: Option<Value>| {
                serde_json::from_value::<Axes>(raw?)
                    .map_err(|e| dropped_vectors.push((name, e.to_string())))
                    .ok()
            };
            let accel = vector("accel", block.accel);
            let gyro = vector("gyro", block.gyro);
            let mag = vector("mag", block.mag);
            Ok(Frame::Reading(ImuReading {
                accel,
                gyro,
                mag,
                roll: block.roll,
                pitch: block.pitch,
                yaw: block.yaw,
                block_present: true,
                dropped_vectors,
            }))
        }
        Some(other) => Err(TelemetryError::unexpected_shape(format!(
            "sensor block is {}, not an object",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_LINE: &str = r#"{"MPU9250": {
        "accel": {"x": 0.01, "y": -0.02, "z": 0.98},
        "gyro": {"x": 1.5, "y": 0.0, "z": -0.5},
        "mag": {"x": 20.0, "y": -4.0, "z": 41.0},
        "roll": 12.5, "pitch": -3.25, "yaw": 170.0
    }}"#;

    fn reading(line: &str) -> ImuReading {
        match parse_line(line, DEFAULT_SENSOR_BLOCK) {
            Ok(Frame::Reading(reading)) => reading,
            other => panic!("Expected a reading, got {:?}", other),
        }
    }

    #[test]
    fn test_end_sentinel() {
        assert_eq!(parse_line("END", DEFAULT_SENSOR_BLOCK).unwrap(), Frame::Delimiter);
        assert_eq!(parse_line("  END\r\n", DEFAULT_SENSOR_BLOCK).unwrap(), Frame::Delimiter);
    }

    #[test]
    fn test_full_reading() {
        let reading = reading(&FULL_LINE.replace('\n', " "));
        assert!(reading.block_present);
        assert_eq!(reading.accel, Some(Axes { x: 0.01, y: -0.02, z: 0.98 }));
        assert_eq!(reading.gyro.map(|g| g.x), Some(1.5));
        assert_eq!(reading.mag.map(|m| m.z), Some(41.0));
        assert_eq!(reading.orientation(), Orientation::new(12.5, -3.25, 170.0));
        assert!(reading.missing_angles().is_empty());
    }

    #[test]
    fn test_missing_roll_defaults_to_zero() {
        let reading = reading(r#"{"MPU9250": {"pitch": 5.0, "yaw": -7.0}}"#);
        assert_eq!(reading.orientation(), Orientation::new(0.0, 5.0, -7.0));
        assert_eq!(reading.missing_angles(), vec!["roll"]);
        let warnings = reading.missing_fields();
        assert!(matches!(warnings[0], TelemetryError::MissingField { field: "roll" }));
    }

    #[test]
    fn test_missing_block_defaults_everything() {
        let reading = reading(r#"{"OTHER": {"roll": 1.0}}"#);
        assert!(!reading.block_present);
        assert_eq!(reading.orientation(), Orientation::default());
        assert_eq!(reading.missing_angles(), vec!["roll", "pitch", "yaw"]);
    }

    #[test]
    fn test_custom_block_name() {
        let frame = parse_line(r#"{"ICM20948": {"roll": 4.0}}"#, "ICM20948").unwrap();
        match frame {
            Frame::Reading(reading) => assert_eq!(reading.roll, Some(4.0)),
            other => panic!("Expected a reading, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_lines() {
        assert_eq!(parse_line("12.75", DEFAULT_SENSOR_BLOCK).unwrap(), Frame::Scalar(12.75));
        assert_eq!(parse_line("-3", DEFAULT_SENSOR_BLOCK).unwrap(), Frame::Scalar(-3.0));
        // not JSON but still a float literal
        assert_eq!(parse_line("+4.5", DEFAULT_SENSOR_BLOCK).unwrap(), Frame::Scalar(4.5));
        match parse_line("nan", DEFAULT_SENSOR_BLOCK).unwrap() {
            Frame::Scalar(v) => assert!(v.is_nan()),
            other => panic!("Expected a scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        for line in ["", "   ", "{\"MPU9250\": {", "roll=3", "ENDX"] {
            let err = parse_line(line, DEFAULT_SENSOR_BLOCK).unwrap_err();
            assert!(
                matches!(err, TelemetryError::Malformed { .. }),
                "Expected malformed for {:?}, got {:?}",
                line,
                err
            );
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_unexpected_shapes() {
        let lines = [
            "[1, 2, 3]",
            "\"text\"",
            "true",
            r#"{"MPU9250": 5}"#,
            r#"{"MPU9250": {"roll": "ten"}}"#,
        ];
        for line in lines {
            let err = parse_line(line, DEFAULT_SENSOR_BLOCK).unwrap_err();
            assert!(
                matches!(err, TelemetryError::UnexpectedShape { .. }),
                "Expected unexpected shape for {:?}, got {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_incomplete_vector_keeps_orientation() {
        let reading = reading(
            r#"{"MPU9250": {"accel": {"x": 1.0}, "gyro": [1, 2, 3],
                "mag": {"x": 1.0, "y": 2.0, "z": 3.0}, "roll": 30.0, "pitch": 0.0, "yaw": 0.0}}"#,
        );
        assert_eq!(reading.orientation(), Orientation::new(30.0, 0.0, 0.0));
        assert_eq!(reading.accel, None, "Incomplete accel should be dropped");
        assert_eq!(reading.gyro, None, "Non-object gyro should be dropped");
        assert_eq!(reading.mag, Some(Axes { x: 1.0, y: 2.0, z: 3.0 }));

        let dropped: Vec<_> = reading.dropped_vectors.iter().map(|(name, _)| *name).collect();
        assert_eq!(dropped, vec!["accel", "gyro"]);
        let warnings = reading.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, TelemetryError::UnexpectedShape { .. }) && w.is_recoverable()));
    }

    #[test]
    fn test_null_angle_counts_as_missing() {
        let reading = reading(r#"{"MPU9250": {"roll": null, "pitch": 1.0, "yaw": 2.0}}"#);
        assert_eq!(reading.missing_angles(), vec!["roll"]);
    }
}
