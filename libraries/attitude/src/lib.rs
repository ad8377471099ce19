//! # Attitude
//!
//! Orientation math for the tilt viewer: turns roll, pitch and yaw angles in
//! degrees into a rotation matrix, projects reference axes and a cube through
//! it, and keeps a rolling history of recent samples for charting.
//!
//! ## Conventions
//!
//! - Angles are degrees at the API boundary and are never wrapped.
//! - Roll is about X, pitch about Y, yaw about Z (right-hand rule).
//! - `R = Rz(yaw) * Ry(pitch) * Rx(roll)`, applied as `R * v`.

pub mod history;
pub mod rotation;
pub mod utils;

pub use history::{HistorySnapshot, SampleHistory, ScalarHistory, DEFAULT_CAPACITY};
pub use rotation::{
    axis_tips, rotation_matrix, Cube, Orientation, RotationMatrix, CUBE_FACES,
    CUBE_VIEW_AXIS_LENGTH, DEFAULT_AXIS_LENGTH, DEFAULT_CUBE_HALF_WIDTH,
};

pub use nalgebra;
