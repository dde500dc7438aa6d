//! Cell numbering: linear ↔ structured coordinates and active ↔ complete indices
//!
//! Complete indices cover every geometric cell: matrix cells are
//! `1..=ni·nj·nk`, fracture cells (dual-porosity grids only) follow as
//! `ni·nj·nk+1..=2·ni·nj·nk`. Active indices number only simulated cells,
//! contiguously and in ascending complete order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_types::{CellCoord, Element};
use crate::error::{GridError, GridResult};
use crate::store::{paths, TableStore};

/// Sentinel stored in the complete → active map for inactive cells
pub const INACTIVE: usize = 0;

/// Size facts of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSizes {
    /// Cells along I
    pub ni: usize,
    /// Cells along J
    pub nj: usize,
    /// Cells along K
    pub nk: usize,
    /// Complete cells, matrix plus fracture
    pub n_cells: usize,
    /// Matrix cells (`ni·nj·nk`)
    pub n_matrix: usize,
    /// Fracture cells (0 or `ni·nj·nk`)
    pub n_fracture: usize,
    /// Active cells
    pub n_active: usize,
    /// Active matrix cells
    pub n_active_matrix: usize,
    /// Active fracture cells
    pub n_active_fracture: usize,
}

/// Index mapper for one grid
///
/// Holds the active → complete table and its inverse, derived once at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndex {
    sizes: GridSizes,
    /// Active (position + 1) → complete index
    active_to_complete: Vec<usize>,
    /// Complete (position + 1) → active index, `INACTIVE` when absent
    complete_to_active: Vec<usize>,
}

impl GridIndex {
    /// Build the mapper from grid dimensions and the active → complete table.
    ///
    /// The grid has fractures when the last active cell lies beyond the matrix block.
    ///
    /// # Errors
    /// `InvalidConfig` for a zero dimension; `MalformedTable` if the active
    /// table is not strictly increasing within `[1, 2·ni·nj·nk]`.
    pub fn new(ni: usize, nj: usize, nk: usize, active_to_complete: Vec<usize>) -> GridResult<Self> {
        if ni == 0 || nj == 0 || nk == 0 {
            return Err(GridError::InvalidConfig(format!(
                "grid dimensions must be positive, got {ni}x{nj}x{nk}"
            )));
        }
        let n_matrix = ni * nj * nk;

        if let Some(pos) = active_to_complete
            .windows(2)
            .position(|w| w[1] <= w[0])
        {
            return Err(GridError::malformed(
                paths::ACTIVE_INDEX,
                format!("entries must be strictly increasing (position {})", pos + 1),
            ));
        }
        if let (Some(&first), Some(&last)) = (active_to_complete.first(), active_to_complete.last()) {
            if first < 1 || last > 2 * n_matrix {
                return Err(GridError::malformed(
                    paths::ACTIVE_INDEX,
                    format!("entries must lie in [1, {}]", 2 * n_matrix),
                ));
            }
        }

        let n_active = active_to_complete.len();
        let (n_cells, n_fracture, n_active_matrix) = match active_to_complete.last() {
            Some(&last) if last > n_matrix => {
                let n_active_matrix = active_to_complete.partition_point(|&c| c <= n_matrix);
                (2 * n_matrix, n_matrix, n_active_matrix)
            }
            _ => (n_matrix, 0, n_active),
        };

        let mut complete_to_active = vec![INACTIVE; n_cells];
        for (pos, &cell) in active_to_complete.iter().enumerate() {
            complete_to_active[cell - 1] = pos + 1;
        }

        let sizes = GridSizes {
            ni,
            nj,
            nk,
            n_cells,
            n_matrix,
            n_fracture,
            n_active,
            n_active_matrix,
            n_active_fracture: n_active - n_active_matrix,
        };
        debug!(
            "Grid index {}x{}x{}: {} complete cells, {} active ({} fracture)",
            ni, nj, nk, n_cells, n_active, sizes.n_active_fracture
        );

        Ok(GridIndex {
            sizes,
            active_to_complete,
            complete_to_active,
        })
    }

    /// Matrix-only grid with every cell active
    ///
    /// # Errors
    /// `InvalidConfig` for a zero dimension.
    pub fn all_active(ni: usize, nj: usize, nk: usize) -> GridResult<Self> {
        Self::new(ni, nj, nk, (1..=ni * nj * nk).collect())
    }

    /// Read dimensions and the active table from a store.
    ///
    /// # Errors
    /// Missing or malformed `IGNTID`/`IGNTJD`/`IGNTKD`/`IPSTCS` tables.
    pub fn from_store<S: TableStore + ?Sized>(store: &S) -> GridResult<Self> {
        let ni = read_dimension(store, paths::NI)?;
        let nj = read_dimension(store, paths::NJ)?;
        let nk = read_dimension(store, paths::NK)?;
        let active = to_indices(paths::ACTIVE_INDEX, store.int_table(paths::ACTIVE_INDEX)?)?;
        Self::new(ni, nj, nk, active)
    }

    /// Size facts
    #[inline]
    pub fn sizes(&self) -> &GridSizes {
        &self.sizes
    }

    /// `(ni, nj, nk)`
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.sizes.ni, self.sizes.nj, self.sizes.nk)
    }

    /// True if the grid carries fracture cells
    #[inline]
    pub fn has_fracture(&self) -> bool {
        self.sizes.n_fracture > 0
    }

    /// Number of complete cells
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.sizes.n_cells
    }

    /// Number of active cells
    #[inline]
    pub fn n_active(&self) -> usize {
        self.sizes.n_active
    }

    /// Active → complete table
    pub fn active_cells(&self) -> &[usize] {
        &self.active_to_complete
    }

    /// Fail unless `cell` is a valid complete index.
    ///
    /// # Errors
    /// `OutOfRange` outside `[1, n_cells]`.
    #[inline]
    pub fn check_cell(&self, cell: usize) -> GridResult<()> {
        if cell == 0 || cell > self.sizes.n_cells {
            return Err(GridError::out_of_range("cell", cell as i64, self.sizes.n_cells));
        }
        Ok(())
    }

    /// Structured coordinate of complete cell `n`.
    ///
    /// # Errors
    /// `OutOfRange` outside `[1, n_cells]`.
    pub fn linear_to_structured(&self, n: usize) -> GridResult<CellCoord> {
        self.check_cell(n)?;
        let GridSizes { ni, nj, n_matrix, .. } = self.sizes;
        let offset = n - 1;
        let element = if offset >= n_matrix {
            Element::Fracture
        } else {
            Element::Matrix
        };
        let r = offset % n_matrix;
        Ok(CellCoord {
            i: r % ni + 1,
            j: (r % (ni * nj)) / ni + 1,
            k: r / (ni * nj) + 1,
            element,
        })
    }

    /// [`Self::linear_to_structured`] over many cells, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn linear_to_structured_many(&self, cells: &[usize]) -> GridResult<Vec<CellCoord>> {
        cells
            .par_iter()
            .map(|&n| self.linear_to_structured(n))
            .collect()
    }

    /// Complete index of a structured coordinate.
    ///
    /// # Errors
    /// `OutOfRange` if a coordinate lies outside its dimension, or the
    /// element is `Fracture` on a grid without fractures.
    pub fn structured_to_linear(&self, coord: CellCoord) -> GridResult<usize> {
        let GridSizes { ni, nj, nk, n_matrix, .. } = self.sizes;
        check_axis("i", coord.i, ni)?;
        check_axis("j", coord.j, nj)?;
        check_axis("k", coord.k, nk)?;
        if coord.element == Element::Fracture && !self.has_fracture() {
            return Err(GridError::out_of_range("element", 2, 1));
        }
        Ok((coord.element.number() - 1) * n_matrix
            + (coord.k - 1) * ni * nj
            + (coord.j - 1) * ni
            + coord.i)
    }

    /// [`Self::structured_to_linear`] over many coordinates, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn structured_to_linear_many(&self, coords: &[CellCoord]) -> GridResult<Vec<usize>> {
        coords
            .iter()
            .map(|&c| self.structured_to_linear(c))
            .collect()
    }

    /// Complete index of active cell `active`.
    ///
    /// # Errors
    /// `OutOfRange` outside `[1, n_active]`.
    #[inline]
    pub fn active_to_complete(&self, active: usize) -> GridResult<usize> {
        if active == 0 || active > self.sizes.n_active {
            return Err(GridError::out_of_range(
                "active index",
                active as i64,
                self.sizes.n_active,
            ));
        }
        Ok(self.active_to_complete[active - 1])
    }

    /// [`Self::active_to_complete`] over many cells, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn active_to_complete_many(&self, active: &[usize]) -> GridResult<Vec<usize>> {
        active.iter().map(|&a| self.active_to_complete(a)).collect()
    }

    /// Active index of complete cell `complete`, `None` when inactive.
    ///
    /// # Errors
    /// `OutOfRange` outside `[1, n_cells]`.
    #[inline]
    pub fn complete_to_active(&self, complete: usize) -> GridResult<Option<usize>> {
        self.check_cell(complete)?;
        Ok(match self.complete_to_active[complete - 1] {
            INACTIVE => None,
            a => Some(a),
        })
    }

    /// [`Self::complete_to_active`] over many cells, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn complete_to_active_many(&self, complete: &[usize]) -> GridResult<Vec<Option<usize>>> {
        complete.iter().map(|&c| self.complete_to_active(c)).collect()
    }

    /// True if complete cell `complete` is simulated
    pub fn is_active(&self, complete: usize) -> bool {
        matches!(self.complete_to_active(complete), Ok(Some(_)))
    }

    /// Structural adjacency: the coordinates differ by one unit along exactly one axis.
    ///
    /// Element counts as an axis, so a matrix cell neighbours its own fracture cell.
    /// Independent of whether a connection record exists for the pair.
    pub fn is_neighbor(a: &CellCoord, b: &CellCoord) -> bool {
        a.manhattan_distance(b) == 1
    }

    /// Expand active-domain values to the complete domain, filling inactive cells
    pub fn scatter_to_complete(&self, active_values: &[f64], fill: f64) -> Vec<f64> {
        let mut complete = vec![fill; self.sizes.n_cells];
        for (&cell, &value) in self.active_to_complete.iter().zip(active_values) {
            complete[cell - 1] = value;
        }
        complete
    }

    /// Pick the active cells out of complete-domain values
    pub fn gather_active(&self, complete_values: &[f64]) -> Vec<f64> {
        self.active_to_complete
            .iter()
            .map(|&cell| complete_values.get(cell - 1).copied().unwrap_or(0.0))
            .collect()
    }
}

fn check_axis(what: &'static str, value: usize, dim: usize) -> GridResult<()> {
    if value == 0 || value > dim {
        return Err(GridError::out_of_range(what, value as i64, dim));
    }
    Ok(())
}

fn read_dimension<S: TableStore + ?Sized>(store: &S, path: &str) -> GridResult<usize> {
    let table = store.int_table(path)?;
    match table.first() {
        Some(&n) if n > 0 => Ok(n as usize),
        Some(&n) => Err(GridError::malformed(path, format!("dimension must be positive, got {n}"))),
        None => Err(GridError::malformed(path, "empty dimension table")),
    }
}

/// Convert a 1-based integer index table, rejecting non-positive entries.
pub(crate) fn to_indices(path: &str, values: &[i64]) -> GridResult<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            if v < 1 {
                Err(GridError::malformed(path, format!("index {v} is not 1-based")))
            } else {
                Ok(v as usize)
            }
        })
        .collect()
}
