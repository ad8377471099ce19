use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use attitude::{Cube, RotationMatrix, SampleHistory};
use log::{info, warn};
use telemetry::{Axes, LineSource, Monitor, Slope, Tick};

use crate::chart::{self, auto_range, Bounds, ChartOptions, Series, ANGLE_RANGE};
use crate::config::{View, ViewerConfig};
use crate::link::{Link, LinkEvent};
use crate::scene::{self, SceneOptions, PITCH_COLOR, ROLL_COLOR, YAW_COLOR};

const ANGLE_TICKS: [f64; 5] = [-180.0, -90.0, 0.0, 90.0, 180.0];

pub struct ViewerApp {
    state: State,
    config: ViewerConfig,
    input_name: String,
    source: Option<Box<dyn LineSource + Send>>,
    link: Option<Link>,
    monitor: Monitor,
    rotation: RotationMatrix,
    closed_reason: Option<String>,
    /// Raised by the Ctrl-C handler
    interrupted: Arc<AtomicBool>,
}

impl ViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ViewerConfig,
        input_name: String,
        source: Box<dyn LineSource + Send>,
        interrupted: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state: State::Initializing,
            monitor: Monitor::new(config.monitor_config()),
            config,
            input_name,
            source: Some(source),
            link: None,
            rotation: RotationMatrix::identity(),
            closed_reason: None,
            interrupted,
        }
    }

    fn check_interrupt(&mut self) {
        if self.interrupted.load(Ordering::SeqCst)
            && matches!(self.state, State::Initializing | State::Running)
        {
            self.closed_reason = Some("interrupted".to_string());
            self.state = State::Stopping;
        }
    }

    fn connect_link(&mut self) {
        if let Some(source) = self.source.take() {
            info!("Reading telemetry from {}", self.input_name);
            let stop_timeout = self.config.read_timeout() + Duration::from_millis(500);
            self.link = Some(Link::start(source, stop_timeout));
        }
        self.state = State::Running;
    }

    fn stop_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.stop();
        }
        self.state = State::Stopped;
    }

    fn poll_link(&mut self) {
        let Some(link) = &self.link else {
            return;
        };
        for event in link.drain() {
            match event {
                LinkEvent::Line(line) => match self.monitor.process_line(&line) {
                    Ok(Tick::Orientation { rotation, .. }) => self.rotation = rotation,
                    Ok(_) => {}
                    Err(e) => warn!("Skipping line {:?}: {}", line, e),
                },
                LinkEvent::Closed(reason) => {
                    info!("Telemetry input closed: {}", reason);
                    self.closed_reason = Some(reason);
                    self.state = State::Stopping;
                }
            }
        }
        if self.closed_reason.is_none() && !link.is_running() {
            warn!("Link thread exited without closing the input");
            self.closed_reason = Some("link thread exited".to_string());
            self.state = State::Stopping;
        }
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Input: {}", self.input_name));
            ui.separator();
            let status = match (&self.state, &self.closed_reason) {
                (State::Initializing, _) => "Connecting".to_string(),
                (State::Running, _) => "Running".to_string(),
                (State::Stopping, _) => "Stopping".to_string(),
                (State::Stopped, Some(reason)) => format!("Stopped ({})", reason),
                (State::Stopped, None) => "Stopped".to_string(),
            };
            ui.label(status);
            ui.separator();
            ui.label(format!(
                "{} samples, {} skipped",
                self.monitor.accepted(),
                self.monitor.rejected()
            ));
            if matches!(self.state, State::Running) && ui.button("Disconnect").clicked() {
                self.state = State::Stopping;
            }
        });
    }

    fn reading_panel(&self, ui: &mut egui::Ui) {
        if self.monitor.accepted() == 0 {
            ui.label("Waiting for data...");
            return;
        }

        if self.config.view == View::Scalar {
            if let Some(value) = self.monitor.scalars().latest() {
                let slope = Slope::classify(value, self.config.slope_threshold_deg);
                ui.horizontal(|ui| {
                    ui.label("Tilt:");
                    ui.label(format!("{:.2}° ({})", value, slope));
                });
            }
            return;
        }

        let Some(reading) = self.monitor.last_reading() else {
            return;
        };
        axes_row(ui, "Accel", reading.accel);
        axes_row(ui, "Gyro", reading.gyro);
        axes_row(ui, "Mag", reading.mag);
        let orientation = reading.orientation();
        ui.horizontal(|ui| {
            ui.label("RPY:");
            ui.label(format!(
                "Roll={:.2}°, Pitch={:.2}°, Yaw={:.2}°",
                orientation.roll, orientation.pitch, orientation.yaw
            ));
        });
    }

    fn orientation_view(&self, ui: &mut egui::Ui) {
        let title = format!("{} Orientation", self.config.sensor_block);
        let cube = match self.config.view {
            View::Cube => Some(Cube::new(self.config.cube_half_width)),
            _ => None,
        };
        let options = SceneOptions {
            title: &title,
            axis_length: self.config.axis_length(),
            cube,
        };
        ui.columns(2, |columns| {
            scene::draw(&mut columns[0], &self.rotation, &options);
            orientation_chart(&mut columns[1], self.monitor.history());
        });
    }

    fn scalar_view(&self, ui: &mut egui::Ui) {
        let scalars = self.monitor.scalars();
        let values = scalars.values();
        let (y_min, y_max) = auto_range(scalars.range());
        let ticks = [y_min, (y_min + y_max) / 2.0, y_max];
        chart::draw(
            ui,
            &ChartOptions {
                title: "Tilt (Pitch) Over Time",
                x_label: "Time",
                y_label: "Tilt (°)",
                bounds: Bounds {
                    x_max: scalars.capacity() as f64,
                    y_min,
                    y_max,
                },
                y_ticks: &ticks,
            },
            &[Series {
                name: "",
                color: PITCH_COLOR,
                values: &values,
            }],
        );
    }
}

fn orientation_chart(ui: &mut egui::Ui, history: &SampleHistory) {
    let snapshot = history.snapshot();
    chart::draw(
        ui,
        &ChartOptions {
            title: "Roll, Pitch, Yaw Over Time",
            x_label: "Time (frames)",
            y_label: "Angle (°)",
            bounds: Bounds {
                x_max: history.capacity() as f64,
                y_min: ANGLE_RANGE.0,
                y_max: ANGLE_RANGE.1,
            },
            y_ticks: &ANGLE_TICKS,
        },
        &[
            Series {
                name: "Roll",
                color: ROLL_COLOR,
                values: &snapshot.roll,
            },
            Series {
                name: "Pitch",
                color: PITCH_COLOR,
                values: &snapshot.pitch,
            },
            Series {
                name: "Yaw",
                color: YAW_COLOR,
                values: &snapshot.yaw,
            },
        ],
    );
}

fn axes_row(ui: &mut egui::Ui, name: &str, axes: Option<Axes>) {
    ui.horizontal(|ui| {
        ui.label(format!("{}:", name));
        match axes {
            Some(Axes { x, y, z }) => ui.label(format!("x={:.3}, y={:.3}, z={:.3}", x, y, z)),
            None => ui.weak("n/a"),
        };
    });
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_interrupt();
        match self.state {
            State::Initializing => self.connect_link(),
            State::Running => self.poll_link(),
            State::Stopping => self.stop_link(),
            State::Stopped => {}
        }
        if matches!(self.state, State::Stopped) && self.interrupted.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::TopBottomPanel::top("status").show(ctx, |ui| self.status_bar(ui));
        egui::TopBottomPanel::bottom("reading").show(ctx, |ui| self.reading_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| match self.config.view {
            View::Axes | View::Cube => self.orientation_view(ui),
            View::Scalar => self.scalar_view(ui),
        });

        if !matches!(self.state, State::Stopped) {
            ctx.request_repaint_after(self.config.refresh_interval());
        }
    }
}

enum State {
    Initializing,
    Running,
    Stopping,
    Stopped,
}
