use attitude::nalgebra as na;
use attitude::{axis_tips, utils::deg_to_rad, Cube, RotationMatrix};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui};

pub const ROLL_COLOR: Color32 = Color32::from_rgb(214, 39, 40);
pub const PITCH_COLOR: Color32 = Color32::from_rgb(44, 160, 44);
pub const YAW_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

const FACE_FILL: Color32 = Color32::from_rgba_premultiplied(81, 124, 141, 153);
const AXIS_LABELS: [&str; 3] = ["X (Roll)", "Y (Pitch)", "Z (Yaw)"];

/// Fixed parallel-projection camera looking at the origin
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    right: na::Vector3<f64>,
    up: na::Vector3<f64>,
    toward_viewer: na::Vector3<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(30.0, -60.0)
    }
}

impl Camera {
    /// Camera at `elevation` degrees above the XY plane, `azimuth` degrees
    /// around Z measured from +X.
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        let (se, ce) = deg_to_rad(elevation).sin_cos();
        let (sa, ca) = deg_to_rad(azimuth).sin_cos();
        Self {
            right: na::Vector3::new(-sa, ca, 0.0),
            up: na::Vector3::new(-se * ca, -se * sa, ce),
            toward_viewer: na::Vector3::new(ce * ca, ce * sa, se),
        }
    }

    /// Screen-plane coordinates (x right, y up) and depth (larger is closer)
    pub fn project(&self, point: &na::Vector3<f64>) -> (f64, f64, f64) {
        (
            point.dot(&self.right),
            point.dot(&self.up),
            point.dot(&self.toward_viewer),
        )
    }

    pub fn depth(&self, point: &na::Vector3<f64>) -> f64 {
        point.dot(&self.toward_viewer)
    }
}

/// Faces ordered farthest first, for painter's-algorithm drawing
pub fn faces_back_to_front(
    faces: [[na::Vector3<f64>; 4]; 6],
    camera: &Camera,
) -> Vec<[na::Vector3<f64>; 4]> {
    let mean_depth = |face: &[na::Vector3<f64>; 4]| {
        face.iter().map(|corner| camera.depth(corner)).sum::<f64>() / 4.0
    };
    let mut ordered = faces.to_vec();
    ordered.sort_by(|a, b| mean_depth(a).total_cmp(&mean_depth(b)));
    ordered
}

pub struct SceneOptions<'a> {
    pub title: &'a str,
    pub axis_length: f64,
    /// Drawn only when set
    pub cube: Option<Cube>,
}

/// Maps scene coordinates in [-1, 1]^3 into a screen rectangle
struct Viewport {
    camera: Camera,
    center: Pos2,
    scale: f32,
}

impl Viewport {
    fn new(camera: Camera, rect: Rect) -> Self {
        // the [-1, 1] box projects to at most sqrt(3) from the center
        let scale = 0.5 * rect.width().min(rect.height()) / 3.0_f32.sqrt();
        Self {
            camera,
            center: rect.center(),
            scale,
        }
    }

    fn to_screen(&self, point: &na::Vector3<f64>) -> Pos2 {
        let (x, y, _) = self.camera.project(point);
        Pos2::new(
            self.center.x + x as f32 * self.scale,
            self.center.y - y as f32 * self.scale,
        )
    }
}

pub fn draw(ui: &mut Ui, rotation: &RotationMatrix, options: &SceneOptions<'_>) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let rect = response.rect;
    let viewport = Viewport::new(Camera::default(), rect.shrink(24.0));
    let text_color = ui.visuals().text_color();

    painter.text(
        rect.center_top(),
        Align2::CENTER_TOP,
        options.title,
        FontId::proportional(15.0),
        text_color,
    );

    draw_bounding_box(&painter, &viewport, Stroke::new(1.0, ui.visuals().weak_text_color()));

    if let Some(cube) = &options.cube {
        for face in faces_back_to_front(cube.faces(rotation), &viewport.camera) {
            let points = face.iter().map(|corner| viewport.to_screen(corner)).collect();
            painter.add(Shape::convex_polygon(
                points,
                FACE_FILL,
                Stroke::new(1.0, Color32::BLACK),
            ));
        }
    }

    let origin = viewport.to_screen(&na::Vector3::zeros());
    let colors = [ROLL_COLOR, PITCH_COLOR, YAW_COLOR];
    for ((tip, color), label) in axis_tips(rotation, options.axis_length)
        .iter()
        .zip(colors)
        .zip(AXIS_LABELS)
    {
        let end = viewport.to_screen(tip);
        painter.arrow(origin, end - origin, Stroke::new(2.5, color));
        painter.text(end, Align2::LEFT_BOTTOM, label, FontId::proportional(12.0), color);
    }

    // legend
    for (i, (label, color)) in AXIS_LABELS.iter().zip(colors).enumerate() {
        painter.text(
            rect.left_top() + egui::vec2(6.0, 24.0 + i as f32 * 16.0),
            Align2::LEFT_TOP,
            format!("- {}", label),
            FontId::proportional(12.0),
            color,
        );
    }
}

fn draw_bounding_box(painter: &egui::Painter, viewport: &Viewport, stroke: Stroke) {
    let corners = Cube::new(1.0).corners();
    // bottom ring, top ring, verticals
    const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];
    for (a, b) in EDGES {
        painter.line_segment(
            [viewport.to_screen(&corners[a]), viewport.to_screen(&corners[b])],
            stroke,
        );
    }
}
