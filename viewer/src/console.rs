use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use log::{info, warn};
use telemetry::{LineSource, Monitor, MonitorConfig, TelemetryError};

/// Read, parse and record lines on the current thread until the source ends
/// or `interrupted` is raised.
///
/// Samples are logged by the monitor; bad lines are logged and skipped. The
/// flag is checked between reads, so a serial source notices it within one
/// read timeout.
pub fn run<S: LineSource>(
    mut source: S,
    config: MonitorConfig,
    interrupted: &AtomicBool,
) -> Result<Monitor> {
    let mut monitor = Monitor::new(config);
    let reason = loop {
        if interrupted.load(Ordering::SeqCst) {
            break "interrupted";
        }
        match source.read_line() {
            Ok(Some(line)) => {
                if let Err(e) = monitor.process_line(&line) {
                    warn!("Skipping line {:?}: {}", line, e);
                }
            }
            Ok(None) => continue,
            Err(TelemetryError::Closed) => break "end of stream",
            Err(e) => return Err(e.into()),
        }
    };
    drop(source);
    info!(
        "Input stopped ({}): {} samples recorded, {} lines skipped",
        reason,
        monitor.accepted(),
        monitor.rejected()
    );
    Ok(monitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use telemetry::{ReaderSource, TelemetryResult};

    /// Source that times out forever, like an idle serial port
    struct IdleSource<'a> {
        polls: usize,
        /// Raised after this many polls
        interrupt_after: usize,
        interrupted: &'a AtomicBool,
        dropped: Arc<AtomicBool>,
    }

    impl LineSource for IdleSource<'_> {
        fn read_line(&mut self) -> TelemetryResult<Option<String>> {
            self.polls += 1;
            if self.polls == self.interrupt_after {
                self.interrupted.store(true, Ordering::SeqCst);
            }
            Ok(None)
        }
    }

    impl Drop for IdleSource<'_> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_replays_mixed_capture() {
        let capture = "\
{\"MPU9250\": {\"roll\": 1.0, \"pitch\": 2.0, \"yaw\": 3.0}}
END
not json at all
{\"MPU9250\": {\"pitch\": 4.0, \"yaw\": 5.0}}
END
";
        let interrupted = AtomicBool::new(false);
        let monitor = run(
            ReaderSource::new(Cursor::new(capture)),
            MonitorConfig::default(),
            &interrupted,
        )
        .expect("Replay should finish cleanly");

        assert_eq!(monitor.accepted(), 2);
        assert_eq!(monitor.rejected(), 1);
        let snapshot = monitor.history().snapshot();
        assert_eq!(snapshot.roll, vec![1.0, 0.0]);
        assert_eq!(snapshot.pitch, vec![2.0, 4.0]);
        assert_eq!(snapshot.yaw, vec![3.0, 5.0]);
    }

    #[test]
    fn test_replays_scalar_capture() {
        let config = MonitorConfig {
            history_capacity: 3,
            ..Default::default()
        };
        let interrupted = AtomicBool::new(false);
        let monitor = run(
            ReaderSource::new(Cursor::new("5\nabc\n-12.5\n")),
            config,
            &interrupted,
        )
        .unwrap();
        assert_eq!(monitor.scalars().values(), vec![0.0, 5.0, -12.5]);
        assert_eq!(monitor.rejected(), 1);
    }

    #[test]
    fn test_interrupt_stops_idle_source() {
        let interrupted = AtomicBool::new(false);
        let dropped = Arc::new(AtomicBool::new(false));
        let source = IdleSource {
            polls: 0,
            interrupt_after: 3,
            interrupted: &interrupted,
            dropped: dropped.clone(),
        };

        let monitor = run(source, MonitorConfig::default(), &interrupted)
            .expect("Interrupt should end the loop cleanly");

        assert_eq!(monitor.accepted(), 0);
        assert!(dropped.load(Ordering::SeqCst), "Source should be dropped on interrupt");
    }

    #[test]
    fn test_interrupt_before_first_read() {
        let interrupted = AtomicBool::new(true);
        let monitor = run(
            ReaderSource::new(Cursor::new("1.0\n")),
            MonitorConfig::default(),
            &interrupted,
        )
        .unwrap();
        assert_eq!(monitor.accepted(), 0, "No line should be read once interrupted");
    }
}
