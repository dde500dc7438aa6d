//! Shared-face resolution for connections
//!
//! On an aligned grid the `+` face of `cell_i` and the `-` face of `cell_j`
//! are the same quadrilateral. Across a fault they are offset vertically and
//! the shared interface is the overlap of the two, built here from the face
//! corners plus intersections of their top and bottom edges.

use rayon::prelude::*;
use tracing::debug;

use super::{Connection, ConnectionKind};
use crate::config::EngineConfig;
use crate::core_types::Vec3;
use crate::error::{GridError, GridResult};
use crate::geometry::{lines_intersection, plane_properties, scaled_distance, PlaneProperties};
use crate::grid::GridCoordinates;

/// Shared interface of two connected cells
#[derive(Debug, Clone, PartialEq)]
pub enum SharedFace {
    /// Both faces coincide; holds `cell_i`'s face
    Coincident([Vec3; 4]),
    /// Overlap polygon of two offset faces, in `cell_i`'s face winding
    Intersection(Vec<Vec3>),
}

impl SharedFace {
    /// Polygon vertices
    pub fn points(&self) -> &[Vec3] {
        match self {
            SharedFace::Coincident(face) => face,
            SharedFace::Intersection(points) => points,
        }
    }

    pub fn is_coincident(&self) -> bool {
        matches!(self, SharedFace::Coincident(_))
    }

    /// Center and area-normal of the polygon
    pub fn plane_properties(&self, precise_area: bool) -> PlaneProperties {
        plane_properties(self.points(), precise_area)
    }
}

/// A connection with both cell faces and their shared interface
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnection {
    pub connection: Connection,
    /// `+` face of `cell_i`
    pub face_i: [Vec3; 4],
    /// `-` face of `cell_j`
    pub face_j: [Vec3; 4],
    pub shared: SharedFace,
}

/// Resolves shared faces with fixed tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceResolver {
    epsilon: f64,
    z_scale: f64,
}

impl FaceResolver {
    pub fn new(epsilon: f64, z_scale: f64) -> Self {
        FaceResolver { epsilon, z_scale }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.epsilon, config.z_scale)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    /// True if every vertex pair is closer than epsilon in the scaled metric
    pub fn coincident(&self, face_i: &[Vec3; 4], face_j: &[Vec3; 4]) -> bool {
        face_i
            .iter()
            .zip(face_j)
            .all(|(a, b)| scaled_distance(a, b, self.z_scale) < self.epsilon)
    }

    /// Shared interface of `face_i` (`+` face of `connection.cell_i`) and
    /// `face_j` (`-` face of `connection.cell_j`).
    ///
    /// Matrix-fracture pairs occupy the same block, so their interface is
    /// `face_i` as is.
    ///
    /// # Errors
    /// `FacesNotConnected` when the faces do not overlap or their edges run
    /// parallel, `LinesSkew` when two crossing edges miss each other by more
    /// than epsilon.
    pub fn resolve_faces(
        &self,
        connection: &Connection,
        face_i: &[Vec3; 4],
        face_j: &[Vec3; 4],
    ) -> GridResult<SharedFace> {
        if connection.kind == ConnectionKind::MatrixFracture || self.coincident(face_i, face_j) {
            return Ok(SharedFace::Coincident(*face_i));
        }
        self.overlap(face_i, face_j)
            .map(SharedFace::Intersection)
            .map_err(|err| match err {
                GridError::ParallelLines | GridError::FacesNotConnected { .. } => {
                    GridError::FacesNotConnected {
                        cell_i: connection.cell_i,
                        cell_j: connection.cell_j,
                    }
                }
                other => other,
            })
    }

    /// Overlap polygon of two offset I or J faces.
    ///
    /// Vertices 0/3 are the top edge, 1/2 the bottom edge, and depth grows
    /// with z. On each side the overlap runs from the deeper of the two top
    /// corners to the shallower of the two bottom corners; where that range
    /// is empty, the side collapses to the point where the bounding edges
    /// cross. Top edges or bottom edges that cross each other add a vertex.
    fn overlap(&self, face_i: &[Vec3; 4], face_j: &[Vec3; 4]) -> GridResult<Vec<Vec3>> {
        let faces = [face_i, face_j];
        // 1 where face_i's vertex is deeper than face_j's
        let deeper = |v: usize| usize::from(face_i[v].z > face_j[v].z);
        let (d0, d1, d2, d3) = (deeper(0), deeper(1), deeper(2), deeper(3));

        let top_left = faces[1 - d0][0];
        let bottom_left = faces[d1][1];
        let bottom_right = faces[d2][2];
        let top_right = faces[1 - d3][3];

        let left_open = top_left.z <= bottom_left.z;
        let tops_cross = d0 != d3;
        let right_open = top_right.z <= bottom_right.z;
        let bottoms_cross = d1 != d2;

        if !(left_open || tops_cross || right_open || bottoms_cross) {
            return Err(GridError::FacesNotConnected {
                cell_i: 0,
                cell_j: 0,
            });
        }

        let mut points = Vec::with_capacity(6);
        if left_open {
            points.push(top_left);
            points.push(bottom_left);
        } else {
            let top = faces[1 - d0];
            let bottom = faces[d1];
            points.push(self.intersect(&top[0], &top[3], &bottom[1], &bottom[2])?);
        }

        if bottoms_cross {
            points.push(self.intersect(&face_i[1], &face_i[2], &face_j[1], &face_j[2])?);
        }

        if right_open {
            points.push(bottom_right);
            points.push(top_right);
        } else {
            let bottom = faces[d2];
            let top = faces[1 - d3];
            points.push(self.intersect(&bottom[1], &bottom[2], &top[0], &top[3])?);
        }

        if tops_cross {
            points.push(self.intersect(&face_i[0], &face_i[3], &face_j[0], &face_j[3])?);
        }

        Ok(points)
    }

    #[inline]
    fn intersect(&self, a0: &Vec3, a1: &Vec3, b0: &Vec3, b1: &Vec3) -> GridResult<Vec3> {
        lines_intersection(a0, a1, b0, b1, self.epsilon, self.z_scale)
    }

    /// Look up both faces of `connection` and resolve their interface.
    ///
    /// # Errors
    /// Unknown cells, or any error of [`Self::resolve_faces`].
    pub fn resolve(
        &self,
        coordinates: &GridCoordinates,
        connection: &Connection,
    ) -> GridResult<ResolvedConnection> {
        let (plus, minus) = connection.kind.faces();
        let face_i = coordinates.face_nodes(connection.cell_i, plus)?;
        let face_j = coordinates.face_nodes(connection.cell_j, minus)?;
        let shared = self.resolve_faces(connection, &face_i, &face_j)?;
        Ok(ResolvedConnection {
            connection: *connection,
            face_i,
            face_j,
            shared,
        })
    }

    /// Resolve a batch of connections, returned in input order.
    ///
    /// Face lookups run per connection kind over the whole group; the
    /// interface polygons are then resolved in parallel. One failure fails
    /// the batch.
    ///
    /// # Errors
    /// An error from any connection of the batch.
    pub fn resolve_many(
        &self,
        coordinates: &GridCoordinates,
        connections: &[Connection],
    ) -> GridResult<Vec<ResolvedConnection>> {
        let mut slots: Vec<Option<ResolvedConnection>> = vec![None; connections.len()];

        for kind in ConnectionKind::ALL {
            let positions: Vec<usize> = connections
                .iter()
                .enumerate()
                .filter(|(_, c)| c.kind == kind)
                .map(|(p, _)| p)
                .collect();
            if positions.is_empty() {
                continue;
            }

            let (plus, minus) = kind.faces();
            let cells_i: Vec<usize> = positions.iter().map(|&p| connections[p].cell_i).collect();
            let cells_j: Vec<usize> = positions.iter().map(|&p| connections[p].cell_j).collect();
            let faces_i = coordinates.face_nodes_many(&cells_i, plus)?;
            let faces_j = coordinates.face_nodes_many(&cells_j, minus)?;

            let group = positions
                .par_iter()
                .zip(faces_i.par_iter().zip(faces_j.par_iter()))
                .map(|(&p, (face_i, face_j))| {
                    let connection = connections[p];
                    let shared = self.resolve_faces(&connection, face_i, face_j)?;
                    Ok(ResolvedConnection {
                        connection,
                        face_i: *face_i,
                        face_j: *face_j,
                        shared,
                    })
                })
                .collect::<GridResult<Vec<_>>>()?;

            let offset = group.iter().filter(|r| !r.shared.is_coincident()).count();
            debug!(
                "Resolved {} {} connections ({} offset)",
                group.len(),
                kind,
                offset
            );

            for (p, resolved) in positions.into_iter().zip(group) {
                slots[p] = Some(resolved);
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

impl Default for FaceResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// I+ style face at x, spanning y in [0, width], top/bottom depth per side:
    /// (v0, v1) at y = width, (v3, v2) at y = 0
    fn i_face(x: f64, width: f64, left: (f64, f64), right: (f64, f64)) -> [Vec3; 4] {
        [
            Vec3::new(x, width, left.0),
            Vec3::new(x, width, left.1),
            Vec3::new(x, 0.0, right.1),
            Vec3::new(x, 0.0, right.0),
        ]
    }

    fn conn() -> Connection {
        Connection::new(1, 2, ConnectionKind::I)
    }

    #[test]
    fn test_aligned_faces_are_coincident() {
        let face = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let shared = FaceResolver::default().resolve_faces(&conn(), &face, &face).unwrap();
        assert_eq!(shared, SharedFace::Coincident(face));
    }

    #[test]
    fn test_small_vertical_offset_is_coincident() {
        // 0.001 deep, 0.1 after scaling, under epsilon 1
        let face_i = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = i_face(10.0, 20.0, (0.001, 10.001), (0.001, 10.001));
        let shared = FaceResolver::default()
            .resolve_faces(&conn(), &face_i, &face_j)
            .unwrap();
        assert!(shared.is_coincident());
        assert_eq!(shared.points(), &face_i[..]);
    }

    #[test]
    fn test_fault_step_overlap() {
        let face_i = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = i_face(10.0, 20.0, (4.0, 14.0), (4.0, 14.0));
        let shared = FaceResolver::default()
            .resolve_faces(&conn(), &face_i, &face_j)
            .unwrap();

        let expected = [
            Vec3::new(10.0, 20.0, 4.0),
            Vec3::new(10.0, 20.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 4.0),
        ];
        let points = shared.points();
        assert_eq!(points.len(), 4);
        for (p, e) in points.iter().zip(&expected) {
            assert_relative_eq!(*p, *e, epsilon = 1e-9);
        }

        let props = shared.plane_properties(false);
        assert_relative_eq!(props.center, Vec3::new(10.0, 10.0, 7.0), epsilon = 1e-9);
        assert_relative_eq!(props.normal, Vec3::new(120.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_crossing_edges() {
        // face_j tilted so both its top and bottom edges cross face_i's
        let face_i = i_face(100.0, 10.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = i_face(100.0, 10.0, (-1.0, 9.0), (1.0, 11.0));
        let shared = FaceResolver::default()
            .resolve_faces(&conn(), &face_i, &face_j)
            .unwrap();

        let expected = [
            Vec3::new(100.0, 10.0, 0.0),
            Vec3::new(100.0, 10.0, 9.0),
            Vec3::new(100.0, 5.0, 10.0),
            Vec3::new(100.0, 0.0, 10.0),
            Vec3::new(100.0, 0.0, 1.0),
            Vec3::new(100.0, 5.0, 0.0),
        ];
        let points = shared.points();
        assert_eq!(points.len(), expected.len());
        for (p, e) in points.iter().zip(&expected) {
            assert_relative_eq!(*p, *e, epsilon = 1e-9);
        }

        let props = shared.plane_properties(false);
        assert_relative_eq!(props.center, Vec3::new(100.0, 5.0, 5.0), epsilon = 1e-9);
        assert_relative_eq!(props.normal, Vec3::new(95.0, 0.0, 0.0), epsilon = 1e-9);
        // Same orientation as face_i
        let own = plane_properties(&face_i, false);
        assert!(own.normal.dot(&props.normal) > 0.0);
    }

    #[test]
    fn test_disjoint_faces() {
        let face_i = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = i_face(10.0, 20.0, (12.0, 22.0), (12.0, 22.0));
        let err = FaceResolver::default()
            .resolve_faces(&Connection::new(3, 7, ConnectionKind::I), &face_i, &face_j)
            .unwrap_err();
        assert_eq!(err, GridError::FacesNotConnected { cell_i: 3, cell_j: 7 });
    }

    #[test]
    fn test_twisted_face_edges_are_skew() {
        // face_j's top edge sits 2 east of face_i's: the edges cross in
        // plan view but never meet
        let face_i = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = [
            Vec3::new(12.0, 20.0, 2.0),
            Vec3::new(10.0, 20.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(12.0, 0.0, -2.0),
        ];
        let resolver = FaceResolver::default();
        let err = resolver.resolve_faces(&conn(), &face_i, &face_j).unwrap_err();
        match err {
            GridError::LinesSkew { distance, epsilon } => {
                assert_relative_eq!(distance, 2.0, epsilon = 1e-9);
                assert_eq!(epsilon, resolver.epsilon());
            }
            other => panic!("expected LinesSkew, got {other:?}"),
        }

        // A wider tolerance accepts the same pair
        let loose = FaceResolver::new(3.0, 100.0);
        let shared = loose.resolve_faces(&conn(), &face_i, &face_j).unwrap();
        assert_eq!(shared.points().len(), 5);
    }

    #[test]
    fn test_matrix_fracture_uses_own_face() {
        let face_i = i_face(10.0, 20.0, (0.0, 10.0), (0.0, 10.0));
        let face_j = i_face(10.0, 20.0, (50.0, 60.0), (50.0, 60.0));
        let c = Connection::new(1, 9, ConnectionKind::MatrixFracture);
        let shared = FaceResolver::default().resolve_faces(&c, &face_i, &face_j).unwrap();
        assert_eq!(shared, SharedFace::Coincident(face_i));
    }
}
