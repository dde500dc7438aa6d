//! Centroid, area-normal and area of small planar (or nearly planar) polygons

use crate::core_types::Vec3;

/// Geometric summary of a face polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneProperties {
    /// Arithmetic mean of the vertices
    pub center: Vec3,
    /// Area-weighted normal; its length is the polygon area
    pub normal: Vec3,
}

impl PlaneProperties {
    /// Polygon area (length of the area-normal)
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal.norm()
    }
}

/// Arithmetic mean of `points`, or the origin for an empty slice
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::zeros();
    }
    points.iter().sum::<Vec3>() / points.len() as f64
}

/// Center and area-normal of a closed polygon.
///
/// The polygon is fanned into triangles around its centroid; each triangle
/// contributes half the cross product of its two spokes, so the normal
/// follows the right-hand rule over the vertex order.
///
/// With `precise_area` the normal keeps its direction but its length becomes
/// the summed triangle areas, which is larger than the signed area when the
/// polygon is warped.
pub fn plane_properties(points: &[Vec3], precise_area: bool) -> PlaneProperties {
    let center = centroid(points);
    let n = points.len();

    let mut normal = Vec3::zeros();
    let mut fan_area = 0.0;
    for (a, pa) in points.iter().enumerate() {
        let pb = &points[(a + 1) % n];
        let tri = (pa - center).cross(&(pb - center)) / 2.0;
        fan_area += tri.norm();
        normal += tri;
    }

    if precise_area {
        let length = normal.norm();
        if length > 0.0 {
            normal *= fan_area / length;
        }
    }

    PlaneProperties { center, normal }
}
