use std::io::{BufRead, ErrorKind};

#[cfg(feature = "serial")]
use std::{io::BufReader, time::Duration};

use crate::error::{TelemetryError, TelemetryResult};

/// Supplier of newline-delimited text lines
pub trait LineSource {
    /// Read the next line without its terminator or surrounding whitespace.
    ///
    /// Returns `Ok(None)` when no complete line arrived before the transport
    /// timed out, and `Err(TelemetryError::Closed)` at end of stream.
    fn read_line(&mut self) -> TelemetryResult<Option<String>>;
}

impl<T: LineSource + ?Sized> LineSource for Box<T> {
    fn read_line(&mut self) -> TelemetryResult<Option<String>> {
        (**self).read_line()
    }
}

/// Line source over any buffered reader (stdin, a replay file, a serial port).
///
/// Bytes of a partial line are kept across timeouts, so a slow device never
/// splits a line in two.
pub struct ReaderSource<R> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(256),
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> TelemetryResult<Option<String>> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Err(TelemetryError::Closed),
            Ok(_) => {
                // a full line, or the unterminated tail of the stream
                let line = decode_line(&self.pending);
                self.pending.clear();
                Ok(Some(line))
            }
            Err(e) if is_timeout(e.kind()) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// Decode as UTF-8, dropping invalid byte sequences, and trim
fn decode_line(bytes: &[u8]) -> String {
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim().to_string()
}

/// Serial port opened for reading lines.
///
/// The port is closed when the source is dropped.
#[cfg(feature = "serial")]
pub struct SerialSource {
    path: String,
    inner: ReaderSource<BufReader<Box<dyn serialport::SerialPort>>>,
}

#[cfg(feature = "serial")]
impl SerialSource {
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> TelemetryResult<Self> {
        let port = serialport::new(path, baud_rate).timeout(timeout).open()?;
        log::info!("Opened serial port {} at {} baud", path, baud_rate);
        Ok(Self {
            path: path.to_string(),
            inner: ReaderSource::new(BufReader::new(port)),
        })
    }
}

#[cfg(feature = "serial")]
impl LineSource for SerialSource {
    fn read_line(&mut self) -> TelemetryResult<Option<String>> {
        self.inner.read_line()
    }
}

#[cfg(feature = "serial")]
impl Drop for SerialSource {
    fn drop(&mut self) {
        log::info!("Closed serial port {}", self.path);
    }
}
