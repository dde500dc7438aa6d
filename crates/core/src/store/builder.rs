//! Synthetic grid stores
//!
//! Builds the full table set of a box-shaped corner-point grid: dimensions,
//! active map, geometry, connection table and rock properties. Cells are
//! `dx × dy × dz` with depth growing with K. An optional fault drops every
//! column east of a given I by a fixed throw, which turns the I connections
//! across it into offset (non-neighbour) connections.

use tracing::debug;

use super::{paths, MemoryStore};
use crate::grid::coordinates::regular_blocks;

/// Vertical fault between columns `column` and `column + 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fault {
    /// Last I column on the upthrown side
    pub column: usize,
    /// Downward offset of every cell with `i > column`
    pub throw: f64,
}

/// Builder for a synthetic [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct GridStoreBuilder {
    ni: usize,
    nj: usize,
    nk: usize,
    cell_size: (f64, f64, f64),
    fault: Option<Fault>,
    inactive: Vec<usize>,
    fractures: bool,
    explicit: bool,
    permeability: [f64; 3],
    net_to_gross: Option<f64>,
}

impl GridStoreBuilder {
    /// `ni × nj × nk` grid of 1×1×1 cells, all active, permeability 100
    pub fn new(ni: usize, nj: usize, nk: usize) -> Self {
        GridStoreBuilder {
            ni,
            nj,
            nk,
            cell_size: (1.0, 1.0, 1.0),
            fault: None,
            inactive: Vec::new(),
            fractures: false,
            explicit: false,
            permeability: [100.0; 3],
            net_to_gross: None,
        }
    }

    pub fn cell_size(mut self, dx: f64, dy: f64, dz: f64) -> Self {
        self.cell_size = (dx, dy, dz);
        self
    }

    /// Offset the cells east of `column` downward by `throw`.
    /// Faulted grids are always written with explicit blocks.
    pub fn fault(mut self, column: usize, throw: f64) -> Self {
        self.fault = Some(Fault { column, throw });
        self
    }

    /// Mark complete cells inactive
    pub fn inactive(mut self, cells: &[usize]) -> Self {
        self.inactive.extend_from_slice(cells);
        self
    }

    /// Add a fracture cell behind every matrix cell
    pub fn fractures(mut self, enabled: bool) -> Self {
        self.fractures = enabled;
        self
    }

    /// Write `BLOCKS`/`NODES` even for an unfaulted grid
    pub fn explicit_geometry(mut self, enabled: bool) -> Self {
        self.explicit = enabled;
        self
    }

    /// Same permeability in every direction
    pub fn permeability(mut self, perm: f64) -> Self {
        self.permeability = [perm; 3];
        self
    }

    pub fn permeabilities(mut self, perm_i: f64, perm_j: f64, perm_k: f64) -> Self {
        self.permeability = [perm_i, perm_j, perm_k];
        self
    }

    /// Store a uniform `NET/GROSS` property (written for active cells only)
    pub fn net_to_gross(mut self, ntg: f64) -> Self {
        self.net_to_gross = Some(ntg);
        self
    }

    fn n_matrix(&self) -> usize {
        self.ni * self.nj * self.nk
    }

    fn linear(&self, i: usize, j: usize, k: usize, fracture: bool) -> usize {
        let element = usize::from(fracture) * self.n_matrix();
        element + (k - 1) * self.ni * self.nj + (j - 1) * self.ni + i
    }

    /// Depth shift of column `i`
    fn shift(&self, i: usize) -> f64 {
        match self.fault {
            Some(fault) if i > fault.column => fault.throw,
            _ => 0.0,
        }
    }

    /// Top and bottom depth of cells in column `i`, layer `k`
    fn depth_range(&self, i: usize, k: usize) -> (f64, f64) {
        let dz = self.cell_size.2;
        let top = (k - 1) as f64 * dz + self.shift(i);
        (top, top + dz)
    }

    /// Build the store
    pub fn build(&self) -> MemoryStore {
        let mut store = MemoryStore::new();
        let n_matrix = self.n_matrix();
        let n_cells = if self.fractures { 2 * n_matrix } else { n_matrix };

        store.insert_ints(paths::NI, vec![self.ni as i64]);
        store.insert_ints(paths::NJ, vec![self.nj as i64]);
        store.insert_ints(paths::NK, vec![self.nk as i64]);

        // Active map; active position of each complete cell, 0 when inactive
        let mut active_of = vec![0usize; n_cells + 1];
        let mut active = Vec::with_capacity(n_cells);
        for cell in 1..=n_cells {
            if !self.inactive.contains(&cell) {
                active.push(cell as i64);
                active_of[cell] = active.len();
            }
        }
        store.insert_ints(paths::ACTIVE_INDEX, active.clone());

        if self.fault.is_some() || self.explicit {
            self.write_explicit_geometry(&mut store);
        } else {
            self.write_regular_geometry(&mut store);
        }

        let connections = self.connections(&active_of);
        debug!(
            "Synthetic {}x{}x{} grid: {} active cells, {} connections",
            self.ni,
            self.nj,
            self.nk,
            active.len(),
            connections.len()
        );
        let (cell_1, rest): (Vec<i64>, Vec<(i64, i64)>) =
            connections.into_iter().map(|(a, b, d)| (a, (b, d))).unzip();
        let (cell_2, direction): (Vec<i64>, Vec<i64>) = rest.into_iter().unzip();
        store.insert_ints(paths::CONNECTION_CELL_1, cell_1);
        store.insert_ints(paths::CONNECTION_CELL_2, cell_2);
        store.insert_ints(paths::CONNECTION_DIRECTION, direction);

        let [perm_i, perm_j, perm_k] = self.permeability;
        store.insert_property(paths::PERM_I, vec![perm_i; n_cells]);
        store.insert_property(paths::PERM_J, vec![perm_j; n_cells]);
        store.insert_property(paths::PERM_K, vec![perm_k; n_cells]);
        if let Some(ntg) = self.net_to_gross {
            store.insert_property(paths::NET_TO_GROSS, vec![ntg; active.len()]);
        }

        store
    }

    fn write_regular_geometry(&self, store: &mut MemoryStore) {
        let (dx, dy, dz) = self.cell_size;
        let n_nodes = (self.ni + 1) * (self.nj + 1) * (self.nk + 1);
        let mut x = Vec::with_capacity(n_nodes);
        let mut y = Vec::with_capacity(n_nodes);
        let mut z = Vec::with_capacity(n_nodes);
        for k in 0..=self.nk {
            for j in 0..=self.nj {
                for i in 0..=self.ni {
                    x.push(i as f64 * dx);
                    y.push(j as f64 * dy);
                    z.push(k as f64 * dz);
                }
            }
        }
        store.insert_floats(paths::X_CORNERS, x);
        store.insert_floats(paths::Y_CORNERS, y);
        store.insert_floats(paths::Z_CORNERS, z);
    }

    /// Eight private nodes per matrix cell, so faulted columns can move freely
    fn write_explicit_geometry(&self, store: &mut MemoryStore) {
        const CORNERS: [(usize, usize, usize); 8] = [
            (0, 0, 0),
            (1, 0, 0),
            (1, 1, 0),
            (0, 1, 0),
            (0, 0, 1),
            (1, 0, 1),
            (1, 1, 1),
            (0, 1, 1),
        ];
        let (dx, dy, _) = self.cell_size;
        let mut nodes = Vec::with_capacity(self.n_matrix() * 24);
        let mut blocks = Vec::with_capacity(self.n_matrix() * 8);
        for k in 1..=self.nk {
            for j in 1..=self.nj {
                for i in 1..=self.ni {
                    let (top, bottom) = self.depth_range(i, k);
                    for (ci, cj, ck) in CORNERS {
                        nodes.push((i - 1 + ci) as f64 * dx);
                        nodes.push((j - 1 + cj) as f64 * dy);
                        nodes.push(if ck == 0 { top } else { bottom });
                        blocks.push((nodes.len() / 3) as i64);
                    }
                }
            }
        }
        store.insert_ints(paths::BLOCKS, blocks);
        store.insert_floats(paths::NODES, nodes);
    }

    /// `(active_a, active_b, direction)` records between active cells
    fn connections(&self, active_of: &[usize]) -> Vec<(i64, i64, i64)> {
        let mut out = Vec::new();
        let mut push = |a: usize, b: usize, code: i64| {
            if active_of[a] != 0 && active_of[b] != 0 {
                out.push((active_of[a] as i64, active_of[b] as i64, code));
            }
        };

        let elements: &[bool] = if self.fractures { &[false, true] } else { &[false] };
        let tolerance = self.cell_size.2 * 1e-6;
        for &fracture in elements {
            for k in 1..=self.nk {
                for j in 1..=self.nj {
                    for i in 1..=self.ni {
                        let here = self.linear(i, j, k, fracture);
                        if i < self.ni {
                            let across_fault = self.fault.is_some_and(|f| f.column == i);
                            if across_fault {
                                let (top, bottom) = self.depth_range(i, k);
                                for k2 in 1..=self.nk {
                                    let (top2, bottom2) = self.depth_range(i + 1, k2);
                                    if bottom.min(bottom2) - top.max(top2) > tolerance {
                                        push(here, self.linear(i + 1, j, k2, fracture), 1);
                                    }
                                }
                            } else {
                                push(here, self.linear(i + 1, j, k, fracture), 1);
                            }
                        }
                        // J records are written upstream-first
                        if j < self.nj {
                            push(self.linear(i, j + 1, k, fracture), here, 2);
                        }
                        if k < self.nk {
                            push(here, self.linear(i, j, k + 1, fracture), 3);
                        }
                    }
                }
            }
        }

        if self.fractures {
            for cell in 1..=self.n_matrix() {
                push(cell, cell + self.n_matrix(), 4);
            }
        }
        out
    }
}
