//! 3-D geometry helpers for face resolution: anisotropic distance, polygon
//! plane properties and closest-point line intersection.

pub mod lines;
pub mod polygon;

pub use lines::lines_intersection;
pub use polygon::{centroid, plane_properties, PlaneProperties};

use crate::core_types::Vec3;

/// Length of `v` with its vertical component multiplied by `z_scale`.
///
/// Grids are much thinner vertically than horizontally, so vertical gaps
/// are weighted up before comparing against a tolerance.
#[inline]
pub fn scaled_norm(v: &Vec3, z_scale: f64) -> f64 {
    (v.x * v.x + v.y * v.y + (v.z * z_scale).powi(2)).sqrt()
}

/// [`scaled_norm`] of `a - b`
#[inline]
pub fn scaled_distance(a: &Vec3, b: &Vec3, z_scale: f64) -> f64 {
    scaled_norm(&(a - b), z_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vertical_component_is_scaled() {
        assert_relative_eq!(scaled_norm(&Vec3::new(3.0, 4.0, 0.0), 100.0), 5.0);
        assert_relative_eq!(scaled_norm(&Vec3::new(0.0, 0.0, 0.01), 100.0), 1.0);
        assert_relative_eq!(
            scaled_distance(&Vec3::new(1.0, 1.0, 1.0), &Vec3::new(1.0, 1.0, 0.5), 2.0),
            1.0
        );
    }
}
