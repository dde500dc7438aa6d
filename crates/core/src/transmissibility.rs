//! Two-point transmissibility between connected cells
//!
//! ```text
//! T   = 1 / (1/T_i + 1/T_j)
//! T_x = K_x · NTG_x · (A·D_x) / (D_x·D_x)
//! ```
//!
//! `A` is the area-normal of the shared face and `D_x` runs from the center
//! of cell x to the shared-face centroid. Both are taken component-wise in
//! absolute value so the face winding cancels out. `K_x` is the permeability
//! along the connection direction (K for matrix-fracture connections).
//! Net-to-gross only thins I and J flow: it is 1 for K and matrix-fracture
//! connections, and 1 everywhere when the grid stores none.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::connections::{Connection, ConnectionKind, FaceResolver, ResolvedConnection};
use crate::core_types::{IndexDomain, Vec3};
use crate::error::{GridError, GridResult};
use crate::geometry::centroid;
use crate::grid::{GridCoordinates, GridIndex};
use crate::store::{paths, TableStore};

/// Per-cell permeabilities and net-to-gross, complete domain
#[derive(Debug, Clone, PartialEq)]
pub struct CellProperties {
    perm_i: Vec<f64>,
    perm_j: Vec<f64>,
    perm_k: Vec<f64>,
    ntg: Option<Vec<f64>>,
}

impl CellProperties {
    /// # Errors
    /// `MalformedTable` if the arrays differ in length.
    pub fn new(
        perm_i: Vec<f64>,
        perm_j: Vec<f64>,
        perm_k: Vec<f64>,
        ntg: Option<Vec<f64>>,
    ) -> GridResult<Self> {
        let n = perm_i.len();
        let check = |name: &str, len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(GridError::malformed(
                    &paths::property(name),
                    format!("{len} values, expected {n}"),
                ))
            }
        };
        check(paths::PERM_J, perm_j.len())?;
        check(paths::PERM_K, perm_k.len())?;
        if let Some(ntg) = &ntg {
            check(paths::NET_TO_GROSS, ntg.len())?;
        }
        Ok(CellProperties {
            perm_i,
            perm_j,
            perm_k,
            ntg,
        })
    }

    /// Same permeability in every direction and cell, no net-to-gross
    pub fn uniform(n_cells: usize, perm: f64) -> Self {
        CellProperties {
            perm_i: vec![perm; n_cells],
            perm_j: vec![perm; n_cells],
            perm_k: vec![perm; n_cells],
            ntg: None,
        }
    }

    /// Load `PERMI`, `PERMJ`, `PERMK` and, if present, `NET/GROSS`.
    ///
    /// # Errors
    /// Missing permeability or tables of the wrong size.
    pub fn from_store<S: TableStore + ?Sized>(store: &S, index: &GridIndex) -> GridResult<Self> {
        let load = |name: &str| store.property(name, index, IndexDomain::Complete);
        let ntg = if store.has_property(paths::NET_TO_GROSS) {
            Some(load(paths::NET_TO_GROSS)?)
        } else {
            debug!("No {} property, using 1.0", paths::NET_TO_GROSS);
            None
        };
        Self::new(load(paths::PERM_I)?, load(paths::PERM_J)?, load(paths::PERM_K)?, ntg)
    }

    pub fn n_cells(&self) -> usize {
        self.perm_i.len()
    }

    pub fn has_net_to_gross(&self) -> bool {
        self.ntg.is_some()
    }

    /// Permeability of complete cell `cell` along `kind`.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn permeability(&self, cell: usize, kind: ConnectionKind) -> GridResult<f64> {
        let values = match kind {
            ConnectionKind::I => &self.perm_i,
            ConnectionKind::J => &self.perm_j,
            ConnectionKind::K | ConnectionKind::MatrixFracture => &self.perm_k,
        };
        lookup(values, cell)
    }

    /// Net-to-gross of `cell` as applied to `kind` connections.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn net_to_gross(&self, cell: usize, kind: ConnectionKind) -> GridResult<f64> {
        match (&self.ntg, kind) {
            (Some(ntg), ConnectionKind::I | ConnectionKind::J) => lookup(ntg, cell),
            _ => lookup(&self.perm_i, cell).map(|_| 1.0),
        }
    }
}

fn lookup(values: &[f64], cell: usize) -> GridResult<f64> {
    cell.checked_sub(1)
        .and_then(|n| values.get(n))
        .copied()
        .ok_or_else(|| GridError::out_of_range("cell", cell as i64, values.len()))
}

/// `(A·D)/(D·D)` with both vectors taken component-wise in absolute value
#[inline]
pub fn area_distance_ratio(normal: &Vec3, distance: &Vec3) -> f64 {
    let d = distance.abs();
    normal.abs().dot(&d) / d.dot(&d)
}

/// Series combination of two half-transmissibilities; 0 if either side is 0
#[inline]
pub fn harmonic(t_i: f64, t_j: f64) -> f64 {
    1.0 / (1.0 / t_i + 1.0 / t_j)
}

/// Computes transmissibilities over one grid's geometry and properties
#[derive(Debug, Clone, Copy)]
pub struct TransmissibilityCalculator<'a> {
    coordinates: &'a GridCoordinates,
    properties: &'a CellProperties,
    resolver: FaceResolver,
    precise_area: bool,
}

impl<'a> TransmissibilityCalculator<'a> {
    pub fn new(
        coordinates: &'a GridCoordinates,
        properties: &'a CellProperties,
        config: &EngineConfig,
    ) -> Self {
        TransmissibilityCalculator {
            coordinates,
            properties,
            resolver: FaceResolver::from_config(config),
            precise_area: config.precise_area,
        }
    }

    /// Half-transmissibilities `(T_i, T_j)` of an already resolved connection.
    ///
    /// # Errors
    /// `OutOfRange` for unknown cells.
    pub fn half_transmissibilities(&self, resolved: &ResolvedConnection) -> GridResult<(f64, f64)> {
        let Connection {
            cell_i,
            cell_j,
            kind,
        } = resolved.connection;
        let plane = resolved.shared.plane_properties(self.precise_area);

        // Matrix and fracture share one block: measure each to its own face
        let (target_i, target_j) = if kind == ConnectionKind::MatrixFracture {
            (centroid(&resolved.face_i), centroid(&resolved.face_j))
        } else {
            (plane.center, plane.center)
        };

        let d_i = target_i - self.coordinates.center_of(cell_i, None)?;
        let d_j = target_j - self.coordinates.center_of(cell_j, None)?;

        let t_i = self.properties.permeability(cell_i, kind)?
            * self.properties.net_to_gross(cell_i, kind)?
            * area_distance_ratio(&plane.normal, &d_i);
        let t_j = self.properties.permeability(cell_j, kind)?
            * self.properties.net_to_gross(cell_j, kind)?
            * area_distance_ratio(&plane.normal, &d_j);
        Ok((t_i, t_j))
    }

    /// Transmissibility of a resolved connection.
    ///
    /// # Errors
    /// See [`Self::half_transmissibilities`].
    pub fn connection_transmissibility(&self, resolved: &ResolvedConnection) -> GridResult<f64> {
        let (t_i, t_j) = self.half_transmissibilities(resolved)?;
        Ok(harmonic(t_i, t_j))
    }

    /// Transmissibility of every connection, aligned with the input.
    ///
    /// # Errors
    /// The first geometric or lookup failure; no partial results.
    pub fn compute(&self, connections: &[Connection]) -> GridResult<Vec<f64>> {
        let resolved = self.resolver.resolve_many(self.coordinates, connections)?;
        let values = resolved
            .par_iter()
            .map(|r| self.connection_transmissibility(r))
            .collect::<GridResult<Vec<_>>>()?;
        info!("Computed {} transmissibilities", values.len());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_area_distance_ratio_ignores_signs() {
        let normal = Vec3::new(-200.0, 0.0, 0.0);
        let d = Vec3::new(5.0, 0.0, 0.0);
        assert_relative_eq!(area_distance_ratio(&normal, &d), 40.0);
        assert_relative_eq!(area_distance_ratio(&-normal, &-d), 40.0);
    }

    #[test]
    fn test_harmonic() {
        assert_relative_eq!(harmonic(2.0, 2.0), 1.0);
        assert_relative_eq!(harmonic(3.0, 6.0), 2.0);
        assert_eq!(harmonic(0.0, 5.0), 0.0);
        assert_relative_eq!(harmonic(1e-12, 1e6), 1e-12, max_relative = 1e-9);
    }

    #[test]
    fn test_net_to_gross_only_thins_lateral_flow() {
        let props = CellProperties::new(
            vec![10.0, 20.0],
            vec![30.0, 40.0],
            vec![50.0, 60.0],
            Some(vec![0.5, 0.25]),
        )
        .unwrap();
        assert_eq!(props.net_to_gross(2, ConnectionKind::I).unwrap(), 0.25);
        assert_eq!(props.net_to_gross(2, ConnectionKind::J).unwrap(), 0.25);
        assert_eq!(props.net_to_gross(2, ConnectionKind::K).unwrap(), 1.0);
        assert_eq!(props.net_to_gross(1, ConnectionKind::MatrixFracture).unwrap(), 1.0);
        assert_eq!(props.permeability(1, ConnectionKind::MatrixFracture).unwrap(), 50.0);
        assert_eq!(props.permeability(2, ConnectionKind::J).unwrap(), 40.0);
        assert!(props.permeability(3, ConnectionKind::I).is_err());
        assert!(props.net_to_gross(0, ConnectionKind::K).is_err());
    }

    #[test]
    fn test_missing_net_to_gross_defaults_to_one() {
        let props = CellProperties::uniform(4, 100.0);
        assert!(!props.has_net_to_gross());
        assert_eq!(props.net_to_gross(3, ConnectionKind::I).unwrap(), 1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = CellProperties::new(vec![1.0; 2], vec![1.0; 3], vec![1.0; 2], None);
        assert!(matches!(err, Err(GridError::MalformedTable { .. })));
    }
}
