//! Corner-node coordinates of cells and faces
//!
//! Geometry comes from one of two sources, picked once at construction:
//! explicit corner-point tables (`BLOCKS` + `NODES`), or a regular grid where
//! only per-node X/Y/Z arrays are stored and the block table is synthesized
//! from `(ni, nj, nk)`. Either way the provider ends up with a validated block
//! table, so lookups afterwards only check the cell index.

use rayon::prelude::*;
use tracing::debug;

use crate::core_types::Vec3;
use crate::error::{GridError, GridResult};
use crate::grid::face::Face;
use crate::grid::index::{to_indices, GridIndex};
use crate::store::{paths, TableStore};

/// Where the cell geometry comes from
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySource {
    /// Stored corner-point tables. `blocks` holds 1-based node numbers, one
    /// entry per complete cell (or per matrix cell, duplicated for fractures).
    Explicit {
        blocks: Vec<[usize; 8]>,
        nodes: Vec<Vec3>,
    },
    /// Regular grid with implicit connectivity; one coordinate per node,
    /// `(ni+1)·(nj+1)·(nk+1)` nodes with I varying fastest.
    Regular {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
}

impl GeometrySource {
    /// Pick the source available in `store`: explicit tables when `BLOCKS`
    /// exists, the regular-grid corner arrays otherwise.
    ///
    /// # Errors
    /// Missing or malformed coordinate tables.
    pub fn from_store<S: TableStore + ?Sized>(store: &S) -> GridResult<Self> {
        if store.table(paths::BLOCKS).is_some() {
            let raw = store.int_table(paths::BLOCKS)?;
            if raw.len() % 8 != 0 {
                return Err(GridError::malformed(
                    paths::BLOCKS,
                    format!("{} entries is not a multiple of 8", raw.len()),
                ));
            }
            let flat = to_indices(paths::BLOCKS, raw)?;
            let blocks = flat
                .chunks_exact(8)
                .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                .collect();

            let raw_nodes = store.float_table(paths::NODES)?;
            if raw_nodes.len() % 3 != 0 {
                return Err(GridError::malformed(
                    paths::NODES,
                    format!("{} entries is not a multiple of 3", raw_nodes.len()),
                ));
            }
            let nodes = raw_nodes
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect();

            return Ok(GeometrySource::Explicit { blocks, nodes });
        }

        Ok(GeometrySource::Regular {
            x: store.float_table(paths::X_CORNERS)?.to_vec(),
            y: store.float_table(paths::Y_CORNERS)?.to_vec(),
            z: store.float_table(paths::Z_CORNERS)?.to_vec(),
        })
    }
}

/// Which source a [`GridCoordinates`] was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Explicit,
    Regular,
}

/// Node and block tables of a grid, ready for lookup
#[derive(Debug, Clone)]
pub struct GridCoordinates {
    /// 0-based node positions per complete cell
    blocks: Vec<[usize; 8]>,
    nodes: Vec<Vec3>,
    kind: GeometryKind,
}

impl GridCoordinates {
    /// Resolve `source` against the grid described by `index`.
    ///
    /// Blocks beyond the last complete cell are ignored.
    ///
    /// # Errors
    /// `MalformedTable` if the block table does not cover the grid or refers
    /// to nodes that do not exist, or the regular corner arrays have the
    /// wrong length.
    pub fn new(source: GeometrySource, index: &GridIndex) -> GridResult<Self> {
        let sizes = index.sizes();
        let (blocks, nodes, kind) = match source {
            GeometrySource::Explicit { blocks, nodes } => {
                let blocks = if blocks.len() >= sizes.n_cells {
                    if blocks.len() > sizes.n_cells {
                        // Dual-porosity files keep fracture blocks even with no active fracture
                        debug!(
                            "Using the first {} of {} blocks",
                            sizes.n_cells,
                            blocks.len()
                        );
                    }
                    let mut blocks = blocks;
                    blocks.truncate(sizes.n_cells);
                    blocks
                } else if index.has_fracture() && blocks.len() == sizes.n_matrix {
                    duplicate_for_fractures(blocks)
                } else {
                    return Err(GridError::malformed(
                        paths::BLOCKS,
                        format!("{} blocks for {} cells", blocks.len(), sizes.n_cells),
                    ));
                };
                (blocks, nodes, GeometryKind::Explicit)
            }
            GeometrySource::Regular { x, y, z } => {
                let n_nodes = (sizes.ni + 1) * (sizes.nj + 1) * (sizes.nk + 1);
                for (path, values) in [
                    (paths::X_CORNERS, &x),
                    (paths::Y_CORNERS, &y),
                    (paths::Z_CORNERS, &z),
                ] {
                    if values.len() != n_nodes {
                        return Err(GridError::malformed(
                            path,
                            format!("{} coordinates for {} nodes", values.len(), n_nodes),
                        ));
                    }
                }
                debug!(
                    "Synthesizing regular block table for {}x{}x{} grid",
                    sizes.ni, sizes.nj, sizes.nk
                );
                let mut blocks = regular_blocks(sizes.ni, sizes.nj, sizes.nk);
                if index.has_fracture() {
                    blocks = duplicate_for_fractures(blocks);
                }
                let nodes = x
                    .iter()
                    .zip(&y)
                    .zip(&z)
                    .map(|((&x, &y), &z)| Vec3::new(x, y, z))
                    .collect();
                (blocks, nodes, GeometryKind::Regular)
            }
        };

        let n_nodes = nodes.len();
        let blocks = blocks
            .into_iter()
            .map(|block| {
                let mut zero_based = [0usize; 8];
                for (slot, &node) in zero_based.iter_mut().zip(&block) {
                    if node == 0 || node > n_nodes {
                        return Err(GridError::malformed(
                            paths::BLOCKS,
                            format!("node {node} outside [1, {n_nodes}]"),
                        ));
                    }
                    *slot = node - 1;
                }
                Ok(zero_based)
            })
            .collect::<GridResult<Vec<_>>>()?;

        debug!(
            "Grid coordinates ({:?}): {} blocks, {} nodes",
            kind,
            blocks.len(),
            n_nodes
        );
        Ok(GridCoordinates {
            blocks,
            nodes,
            kind,
        })
    }

    /// Read whichever geometry source `store` provides.
    ///
    /// # Errors
    /// See [`GeometrySource::from_store`] and [`GridCoordinates::new`].
    pub fn from_store<S: TableStore + ?Sized>(store: &S, index: &GridIndex) -> GridResult<Self> {
        Self::new(GeometrySource::from_store(store)?, index)
    }

    /// Source the tables came from
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of cell blocks (complete cells)
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    fn block(&self, cell: usize) -> GridResult<&[usize; 8]> {
        if cell == 0 {
            return Err(GridError::out_of_range("cell", 0, self.blocks.len()));
        }
        self.blocks
            .get(cell - 1)
            .ok_or_else(|| GridError::out_of_range("cell", cell as i64, self.blocks.len()))
    }

    /// The 8 corner nodes of complete cell `cell`.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn cell_nodes(&self, cell: usize) -> GridResult<[Vec3; 8]> {
        let block = self.block(cell)?;
        Ok(block.map(|n| self.nodes[n]))
    }

    /// The 4 nodes of `face` of complete cell `cell`, in face winding order.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn face_nodes(&self, cell: usize, face: Face) -> GridResult<[Vec3; 4]> {
        let block = self.block(cell)?;
        Ok(face.nodes().map(|p| self.nodes[block[p]]))
    }

    /// [`Self::face_nodes`] for many cells sharing one face, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn face_nodes_many(&self, cells: &[usize], face: Face) -> GridResult<Vec<[Vec3; 4]>> {
        cells
            .par_iter()
            .map(|&cell| self.face_nodes(cell, face))
            .collect()
    }

    /// All 8 cell nodes, or the 4 nodes of `face` when given.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn nodes_of_cell(&self, cell: usize, face: Option<Face>) -> GridResult<Vec<Vec3>> {
        Ok(match face {
            None => self.cell_nodes(cell)?.to_vec(),
            Some(face) => self.face_nodes(cell, face)?.to_vec(),
        })
    }

    /// [`Self::nodes_of_cell`] for many cells, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn nodes_of_cells(&self, cells: &[usize], face: Option<Face>) -> GridResult<Vec<Vec<Vec3>>> {
        cells
            .par_iter()
            .map(|&cell| self.nodes_of_cell(cell, face))
            .collect()
    }

    /// Arithmetic mean of the cell's nodes, or of the face's nodes when given.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn center_of(&self, cell: usize, face: Option<Face>) -> GridResult<Vec3> {
        Ok(match face {
            None => mean(&self.cell_nodes(cell)?),
            Some(face) => mean(&self.face_nodes(cell, face)?),
        })
    }

    /// [`Self::center_of`] for many cells, in input order
    ///
    /// # Errors
    /// The first `OutOfRange` encountered.
    pub fn centers_of(&self, cells: &[usize], face: Option<Face>) -> GridResult<Vec<Vec3>> {
        cells
            .par_iter()
            .map(|&cell| self.center_of(cell, face))
            .collect()
    }
}

fn mean(points: &[Vec3]) -> Vec3 {
    points.iter().sum::<Vec3>() / points.len() as f64
}

/// Block table of a regular grid, 1-based node numbers.
///
/// Corner 0 of cell (i, j, k) is node `i + (j-1)(ni+1) + (k-1)(ni+1)(nj+1)`;
/// the other corners step by one node along I, one row along J and one
/// layer along K.
pub fn regular_blocks(ni: usize, nj: usize, nk: usize) -> Vec<[usize; 8]> {
    let row = ni + 1;
    let layer = (ni + 1) * (nj + 1);
    let mut blocks = Vec::with_capacity(ni * nj * nk);
    for k in 1..=nk {
        for j in 1..=nj {
            for i in 1..=ni {
                let n0 = i + (j - 1) * row + (k - 1) * layer;
                let n3 = n0 + row;
                let n4 = n0 + layer;
                let n7 = n4 + row;
                blocks.push([n0, n0 + 1, n3 + 1, n3, n4, n4 + 1, n7 + 1, n7]);
            }
        }
    }
    blocks
}

fn duplicate_for_fractures(mut blocks: Vec<[usize; 8]>) -> Vec<[usize; 8]> {
    blocks.extend_from_within(..);
    blocks
}
