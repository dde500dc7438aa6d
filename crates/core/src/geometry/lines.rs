//! Closest-point intersection of two 3-D lines

use nalgebra::Matrix3;

use crate::core_types::Vec3;
use crate::error::{GridError, GridResult};
use crate::geometry::scaled_distance;

/// Below this cross-product length the two directions count as parallel
const PARALLEL_EPS: f64 = 1e-6;

/// Intersection of the line through `a0`, `a1` with the line through `b0`, `b1`.
///
/// Finds the closest point on each (infinite) line and returns their
/// midpoint. Two edges of offset faces never meet exactly, so the closest
/// points only have to be within `epsilon` of each other under the
/// `z_scale`-weighted metric.
///
/// # Errors
/// `ParallelLines` if either edge has zero length or the directions are
/// parallel, `LinesSkew` if the closest points are more than `epsilon` apart.
pub fn lines_intersection(
    a0: &Vec3,
    a1: &Vec3,
    b0: &Vec3,
    b1: &Vec3,
    epsilon: f64,
    z_scale: f64,
) -> GridResult<Vec3> {
    let d1 = (a1 - a0).try_normalize(0.0).ok_or(GridError::ParallelLines)?;
    let d2 = (b1 - b0).try_normalize(0.0).ok_or(GridError::ParallelLines)?;

    let cross = d1.cross(&d2);
    let cross_len_sq = cross.norm_squared();
    if cross_len_sq.sqrt() < PARALLEL_EPS {
        return Err(GridError::ParallelLines);
    }

    let r = b0 - a0;
    let t1 = Matrix3::from_columns(&[r, d2, cross]).determinant() / cross_len_sq;
    let t2 = Matrix3::from_columns(&[r, d1, cross]).determinant() / cross_len_sq;

    let on_a = a0 + d1 * t1;
    let on_b = b0 + d2 * t2;

    let distance = scaled_distance(&on_a, &on_b, z_scale);
    if distance > epsilon {
        return Err(GridError::LinesSkew { distance, epsilon });
    }

    Ok((on_a + on_b) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crossing_lines() {
        let p = lines_intersection(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(2.0, 0.0, 2.0),
            &Vec3::new(0.0, 0.0, 2.0),
            &Vec3::new(2.0, 0.0, 0.0),
            1.0,
            100.0,
        )
        .unwrap();
        assert_relative_eq!(p, Vec3::new(1.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_intersection_beyond_segment_ends() {
        let p = lines_intersection(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(5.0, -1.0, 0.0),
            &Vec3::new(5.0, 1.0, 0.0),
            1.0,
            1.0,
        )
        .unwrap();
        assert_relative_eq!(p, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_nearly_touching_lines_meet_halfway() {
        let p = lines_intersection(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.5, -1.0, 0.002),
            &Vec3::new(0.5, 1.0, 0.002),
            1.0,
            100.0,
        )
        .unwrap();
        assert_relative_eq!(p, Vec3::new(0.5, 0.0, 0.001), epsilon = 1e-12);
    }

    #[test]
    fn test_skew_lines() {
        // 0.1 apart vertically, 10 after scaling
        let err = lines_intersection(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.5, -1.0, 0.1),
            &Vec3::new(0.5, 1.0, 0.1),
            1.0,
            100.0,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::LinesSkew { .. }));
    }

    #[test]
    fn test_parallel_and_degenerate() {
        let origin = Vec3::zeros();
        let x = Vec3::new(1.0, 0.0, 0.0);
        let err = lines_intersection(&origin, &x, &Vec3::new(0.0, 1.0, 0.0), &Vec3::new(1.0, 1.0, 0.0), 1.0, 1.0);
        assert_eq!(err, Err(GridError::ParallelLines));
        let err = lines_intersection(&origin, &origin, &origin, &x, 1.0, 1.0);
        assert_eq!(err, Err(GridError::ParallelLines));
    }
}
