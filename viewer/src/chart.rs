use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui};

/// Y-range of the roll/pitch/yaw chart in degrees
pub const ANGLE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Axis ranges of a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Map sample index `i` with value `v` into `rect`
    pub fn to_screen(&self, rect: Rect, i: usize, v: f64) -> Pos2 {
        let tx = if self.x_max > 0.0 { i as f64 / self.x_max } else { 0.0 };
        let ty = (v - self.y_min) / (self.y_max - self.y_min);
        Pos2::new(
            rect.left() + (tx as f32) * rect.width(),
            rect.bottom() - (ty as f32) * rect.height(),
        )
    }
}

/// Y-range for auto-scaling: the data range with 5% padding, at least +/-1
/// around a flat line.
pub fn auto_range(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => (-1.0, 1.0),
        Some((lo, hi)) if hi - lo < f64::EPSILON => (lo - 1.0, hi + 1.0),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    }
}

pub struct Series<'a> {
    pub name: &'a str,
    pub color: Color32,
    pub values: &'a [f64],
}

pub struct ChartOptions<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub bounds: Bounds,
    /// Horizontal grid lines
    pub y_ticks: &'a [f64],
}

pub fn draw(ui: &mut Ui, options: &ChartOptions<'_>, series: &[Series<'_>]) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let outer = response.rect;
    let plot = Rect::from_min_max(
        outer.left_top() + egui::vec2(48.0, 28.0),
        outer.right_bottom() - egui::vec2(12.0, 32.0),
    );
    let text_color = ui.visuals().text_color();
    let weak = ui.visuals().weak_text_color();
    let bounds = options.bounds;

    painter.text(
        outer.center_top(),
        Align2::CENTER_TOP,
        options.title,
        FontId::proportional(15.0),
        text_color,
    );
    painter.text(
        Pos2::new(plot.center().x, outer.bottom() - 4.0),
        Align2::CENTER_BOTTOM,
        options.x_label,
        FontId::proportional(12.0),
        text_color,
    );
    painter.text(
        Pos2::new(outer.left() + 2.0, plot.top() - 4.0),
        Align2::LEFT_BOTTOM,
        options.y_label,
        FontId::proportional(12.0),
        text_color,
    );

    for &tick in options.y_ticks {
        let y = bounds.to_screen(plot, 0, tick).y;
        painter.line_segment(
            [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
            Stroke::new(0.5, weak),
        );
        painter.text(
            Pos2::new(plot.left() - 4.0, y),
            Align2::RIGHT_CENTER,
            format_tick(tick),
            FontId::monospace(10.0),
            weak,
        );
    }
    painter.text(
        Pos2::new(plot.right(), plot.bottom() + 2.0),
        Align2::RIGHT_TOP,
        format!("{}", bounds.x_max),
        FontId::monospace(10.0),
        weak,
    );
    painter.add(Shape::closed_line(
        vec![
            plot.left_top(),
            plot.right_top(),
            plot.right_bottom(),
            plot.left_bottom(),
        ],
        Stroke::new(1.0, weak),
    ));

    let clipped = painter.with_clip_rect(plot);
    for s in series {
        for run in finite_runs(s.values) {
            let points: Vec<Pos2> = run
                .into_iter()
                .map(|(i, v)| bounds.to_screen(plot, i, v))
                .collect();
            if points.len() > 1 {
                clipped.add(Shape::line(points, Stroke::new(1.5, s.color)));
            }
        }
    }

    // legend, upper right
    for (i, s) in series.iter().enumerate() {
        if s.name.is_empty() {
            continue;
        }
        painter.text(
            plot.right_top() + egui::vec2(-6.0, 6.0 + i as f32 * 16.0),
            Align2::RIGHT_TOP,
            format!("- {}", s.name),
            FontId::proportional(12.0),
            s.color,
        );
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Split values into runs of consecutive finite samples, keeping indices
fn finite_runs(values: &[f64]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut run = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            run.push((i, v));
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}
