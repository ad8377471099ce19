use thiserror::Error;

/// Errors produced while reading and decoding telemetry lines.
///
/// Only `Io`, `Serial` and `Closed` concern the transport. Everything else is
/// about a single line and the consumer skips it and keeps going.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Line is neither JSON nor a number
    #[error("Malformed line: {reason}")]
    Malformed {
        /// Decoder message
        reason: String,
    },

    /// Line is valid JSON but not a payload we understand
    #[error("Unexpected payload shape: {reason}")]
    UnexpectedShape {
        /// What was found instead
        reason: String,
    },

    /// An expected field was absent and has been defaulted
    #[error("Missing field {field}, defaulting to 0")]
    MissingField {
        /// Name of the absent field
        field: &'static str,
    },

    /// Reading from the transport failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or configuring the serial port failed
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The transport reached end of stream
    #[error("Line source closed")]
    Closed,
}

impl TelemetryError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        TelemetryError::Malformed {
            reason: reason.into(),
        }
    }

    pub fn unexpected_shape(reason: impl Into<String>) -> Self {
        TelemetryError::UnexpectedShape {
            reason: reason.into(),
        }
    }

    /// Whether the error concerns one line only and the loop can continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TelemetryError::Malformed { .. }
                | TelemetryError::UnexpectedShape { .. }
                | TelemetryError::MissingField { .. }
        )
    }
}

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;
