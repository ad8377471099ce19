use std::{
    sync::mpsc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use log::{info, warn};
use telemetry::{LineSource, TelemetryError};

pub enum LinkCommand {
    Stop,
}

#[derive(Debug, PartialEq)]
pub enum LinkEvent {
    /// One line of telemetry text
    Line(String),
    /// The source ended or failed; no more events follow
    Closed(String),
}

/// Transport thread: owns the line source and forwards raw lines.
///
/// Parsing and all history updates stay on the UI thread.
pub struct LinkWorker {
    source: Box<dyn LineSource + Send>,
}

impl LinkWorker {
    pub fn new(source: Box<dyn LineSource + Send>) -> Self {
        Self { source }
    }

    pub fn run(
        self,
        to_ui_tx: mpsc::Sender<LinkEvent>,
        to_worker_rx: mpsc::Receiver<LinkCommand>,
    ) -> JoinHandle<()> {
        let mut worker = self;
        std::thread::spawn(move || {
            info!("Link thread started");
            loop {
                match to_worker_rx.try_recv() {
                    Ok(LinkCommand::Stop) | Err(mpsc::TryRecvError::Disconnected) => {
                        break;
                    }
                    Err(mpsc::TryRecvError::Empty) => {}
                }

                match worker.source.read_line() {
                    Ok(Some(line)) => {
                        if to_ui_tx.send(LinkEvent::Line(line)).is_err() {
                            break;
                        }
                    }
                    // read timed out, poll for commands again
                    Ok(None) => {}
                    Err(TelemetryError::Closed) => {
                        let _ = to_ui_tx.send(LinkEvent::Closed("end of stream".to_string()));
                        break;
                    }
                    Err(e) => {
                        warn!("Link read failed: {}", e);
                        let _ = to_ui_tx.send(LinkEvent::Closed(e.to_string()));
                        break;
                    }
                }
            }
            // dropping the worker releases the source
            drop(worker);
            info!("Link thread stopped");
        })
    }
}

pub struct Link {
    from_worker_rx: mpsc::Receiver<LinkEvent>,
    to_worker_tx: Option<mpsc::Sender<LinkCommand>>,
    worker_thread: Option<JoinHandle<()>>,
    stop_timeout: Duration,
}

impl Link {
    /// Spawn the transport thread.
    ///
    /// `stop_timeout` bounds how long [`Link::stop`] waits for a blocked read.
    pub fn start(source: Box<dyn LineSource + Send>, stop_timeout: Duration) -> Self {
        let (to_ui_tx, from_worker_rx) = mpsc::channel();
        let (to_worker_tx, to_worker_rx) = mpsc::channel();
        let worker_thread = LinkWorker::new(source).run(to_ui_tx, to_worker_rx);
        Self {
            from_worker_rx,
            to_worker_tx: Some(to_worker_tx),
            worker_thread: Some(worker_thread),
            stop_timeout,
        }
    }

    /// Everything received since the last call, without blocking
    pub fn drain(&self) -> Vec<LinkEvent> {
        self.from_worker_rx.try_iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.worker_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.to_worker_tx.take() {
            let _ = tx.send(LinkCommand::Stop);
        }
        if let Some(handle) = self.worker_thread.take() {
            let deadline = Instant::now() + self.stop_timeout;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                if handle.join().is_err() {
                    warn!("Link thread panicked");
                }
            } else {
                // stdin and files without a timeout can block forever
                warn!("Link thread still blocked on a read, detaching it");
            }
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.stop();
    }
}
