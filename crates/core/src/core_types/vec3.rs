//! Vector type alias for node coordinates, face normals and distance vectors.

use nalgebra::Vector3;

/// 3D vector type for node positions, area-normals and center-to-face vectors.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`. Reservoir grids carry
/// coordinates in the hundreds of kilometres with sub-metre layering, so the
/// engine works in double precision throughout.
pub type Vec3 = Vector3<f64>;
