use core::f64::consts::PI;

/// Convert degrees to radians
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}
