use nalgebra as na;

use crate::utils::deg_to_rad;

/// 3x3 rotation matrix produced from an [`Orientation`]
pub type RotationMatrix = na::Matrix3<f64>;

/// Axis length used by the axes-only presentation
pub const DEFAULT_AXIS_LENGTH: f64 = 0.8;

/// Axis length used when the cube is drawn alongside the axes
pub const CUBE_VIEW_AXIS_LENGTH: f64 = 0.7;

/// Half width of the orientation cube
pub const DEFAULT_CUBE_HALF_WIDTH: f64 = 0.2;

/// Corner indices of the six cube faces.
///
/// Each quad lists the four corners sharing one face of the unrotated cube,
/// in the order returned by [`Cube::corners`].
pub const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [1, 2, 6, 5],
    [3, 0, 4, 7],
];

/// Roll, pitch and yaw angles in degrees
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Rotation about the X axis
    pub roll: f64,
    /// Rotation about the Y axis
    pub pitch: f64,
    /// Rotation about the Z axis
    pub yaw: f64,
}

impl Orientation {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Rotation matrix for this orientation, see [`rotation_matrix`]
    pub fn rotation_matrix(&self) -> RotationMatrix {
        rotation_matrix(self.roll, self.pitch, self.yaw)
    }
}

/// Build the rotation matrix for roll, pitch and yaw given in degrees.
///
/// The elemental rotations are composed as `R = Rz(yaw) * Ry(pitch) * Rx(roll)`:
/// a vector `v` is rotated about X first, then Y, then Z (extrinsic ZYX), by
/// computing `R * v`. Angles are used as given; nothing is wrapped into
/// [-180, 180]. Near pitch = +/-90 roll and yaw become indistinguishable but the
/// result is still a valid rotation.
pub fn rotation_matrix(roll: f64, pitch: f64, yaw: f64) -> RotationMatrix {
    let (sr, cr) = deg_to_rad(roll).sin_cos();
    let (sp, cp) = deg_to_rad(pitch).sin_cos();
    let (sy, cy) = deg_to_rad(yaw).sin_cos();

    let rx = na::Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cr, -sr, //
        0.0, sr, cr,
    );
    let ry = na::Matrix3::new(
        cp, 0.0, sp, //
        0.0, 1.0, 0.0, //
        -sp, 0.0, cp,
    );
    let rz = na::Matrix3::new(
        cy, -sy, 0.0, //
        sy, cy, 0.0, //
        0.0, 0.0, 1.0,
    );

    rz * ry * rx
}

/// Tips of the X, Y and Z reference axes of the given length after rotation
pub fn axis_tips(rotation: &RotationMatrix, length: f64) -> [na::Vector3<f64>; 3] {
    [
        rotation * na::Vector3::new(length, 0.0, 0.0),
        rotation * na::Vector3::new(0.0, length, 0.0),
        rotation * na::Vector3::new(0.0, 0.0, length),
    ]
}

/// Axis-aligned cube centred on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    half_width: f64,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new(DEFAULT_CUBE_HALF_WIDTH)
    }
}

impl Cube {
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// The 8 corners: bottom ring (z = -s) counter-clockwise from (-s, -s),
    /// then the top ring (z = +s) in the same order.
    pub fn corners(&self) -> [na::Vector3<f64>; 8] {
        let s = self.half_width;
        [
            na::Vector3::new(-s, -s, -s),
            na::Vector3::new(s, -s, -s),
            na::Vector3::new(s, s, -s),
            na::Vector3::new(-s, s, -s),
            na::Vector3::new(-s, -s, s),
            na::Vector3::new(s, -s, s),
            na::Vector3::new(s, s, s),
            na::Vector3::new(-s, s, s),
        ]
    }

    pub fn rotated_corners(&self, rotation: &RotationMatrix) -> [na::Vector3<f64>; 8] {
        self.corners().map(|corner| rotation * corner)
    }

    /// Rotated corners grouped into the six face quads of [`CUBE_FACES`]
    pub fn faces(&self, rotation: &RotationMatrix) -> [[na::Vector3<f64>; 4]; 6] {
        let rotated = self.rotated_corners(rotation);
        CUBE_FACES.map(|quad| quad.map(|i| rotated[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_vec_close(actual: na::Vector3<f64>, expected: na::Vector3<f64>) {
        assert!(
            (actual - expected).norm() < TOLERANCE,
            "Expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_zero_angles_is_exact_identity() {
        let r = rotation_matrix(0.0, 0.0, 0.0);
        assert_eq!(r, na::Matrix3::identity(), "Zero angles should give the exact identity");
    }

    #[test]
    fn test_orthonormal_for_arbitrary_angles() {
        let samples = [
            (10.0, 20.0, 30.0),
            (-170.0, 45.0, 95.0),
            (359.0, -89.9, 720.0),
            (0.0, 90.0, 0.0),
            (33.3, 90.0, -12.5),
            (1e4, -2e3, 7.7),
        ];
        for (roll, pitch, yaw) in samples {
            let r = rotation_matrix(roll, pitch, yaw);
            let should_be_identity = r.transpose() * r;
            assert!(
                (should_be_identity - na::Matrix3::identity()).norm() < TOLERANCE,
                "R^T R should be identity for ({}, {}, {})",
                roll,
                pitch,
                yaw
            );
            assert!(
                (r.determinant() - 1.0).abs() < TOLERANCE,
                "Determinant should be 1 for ({}, {}, {})",
                roll,
                pitch,
                yaw
            );
        }
    }

    #[test]
    fn test_roll_maps_y_to_z() {
        let r = rotation_matrix(90.0, 0.0, 0.0);
        assert_vec_close(r * na::Vector3::y(), na::Vector3::z());
    }

    #[test]
    fn test_pitch_maps_z_to_x() {
        let r = rotation_matrix(0.0, 90.0, 0.0);
        assert_vec_close(r * na::Vector3::z(), na::Vector3::x());
    }

    #[test]
    fn test_yaw_maps_x_to_y() {
        let r = rotation_matrix(0.0, 0.0, 90.0);
        assert_vec_close(r * na::Vector3::x(), na::Vector3::y());
    }

    #[test]
    fn test_composition_order_is_z_y_x() {
        let (roll, pitch, yaw) = (25.0, -40.0, 110.0);
        let expected = na::Rotation3::from_euler_angles(
            deg_to_rad(roll),
            deg_to_rad(pitch),
            deg_to_rad(yaw),
        );
        let r = rotation_matrix(roll, pitch, yaw);
        assert!(
            (r - expected.matrix()).norm() < TOLERANCE,
            "Composition should match Rz * Ry * Rx"
        );

        // Reversed order gives a different rotation for the same angles
        let reversed = rotation_matrix(roll, 0.0, 0.0)
            * rotation_matrix(0.0, pitch, 0.0)
            * rotation_matrix(0.0, 0.0, yaw);
        assert!((r - reversed).norm() > 1e-3, "Rx * Ry * Rz should differ from Rz * Ry * Rx");
    }

    #[test]
    fn test_orientation_delegates() {
        let orientation = Orientation::new(12.0, 34.0, 56.0);
        assert_eq!(orientation.rotation_matrix(), rotation_matrix(12.0, 34.0, 56.0));
    }

    #[test]
    fn test_axis_tips() {
        let tips = axis_tips(&na::Matrix3::identity(), DEFAULT_AXIS_LENGTH);
        assert_vec_close(tips[0], na::Vector3::new(0.8, 0.0, 0.0));
        assert_vec_close(tips[1], na::Vector3::new(0.0, 0.8, 0.0));
        assert_vec_close(tips[2], na::Vector3::new(0.0, 0.0, 0.8));

        let tips = axis_tips(&rotation_matrix(0.0, 0.0, 90.0), CUBE_VIEW_AXIS_LENGTH);
        assert_vec_close(tips[0], na::Vector3::new(0.0, 0.7, 0.0));
        assert_vec_close(tips[1], na::Vector3::new(-0.7, 0.0, 0.0));
        assert_vec_close(tips[2], na::Vector3::new(0.0, 0.0, 0.7));
    }

    #[test]
    fn test_cube_faces_share_a_coordinate() {
        let cube = Cube::default();
        let corners = cube.corners();
        for quad in CUBE_FACES {
            // all four corners of an unrotated face agree on one axis
            let shared = (0..3).any(|axis| {
                let value = corners[quad[0]][axis];
                quad.iter().all(|&i| corners[i][axis] == value)
            });
            assert!(shared, "Face {:?} should lie on a cube face", quad);
        }
    }

    #[test]
    fn test_rotated_cube_keeps_its_size() {
        let cube = Cube::new(0.2);
        let r = rotation_matrix(30.0, -60.0, 145.0);
        let expected_radius = (3.0_f64 * 0.2 * 0.2).sqrt();
        for corner in cube.rotated_corners(&r) {
            assert!(
                (corner.norm() - expected_radius).abs() < TOLERANCE,
                "Rotation should keep corners at the same distance"
            );
        }

        let faces = cube.faces(&r);
        let rotated = cube.rotated_corners(&r);
        assert_eq!(faces[0][0], rotated[0]);
        assert_eq!(faces[5][1], rotated[0]);
        assert_eq!(faces[3][3], rotated[6]);
    }
}
