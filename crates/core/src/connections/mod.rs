//! Cell-to-cell connections: reading, canonical ordering and shared faces
//!
//! Raw connection records come from the table store in the active domain,
//! in whatever order the simulator wrote them. [`read_connections`] moves
//! them to the complete domain and orders each pair so that `cell_i` is the
//! downstream cell (smaller coordinate along the connection axis, or the
//! matrix cell of a matrix-fracture pair). Every consumer relies on that
//! order; nothing re-derives it.

pub mod resolve;

pub use resolve::{FaceResolver, ResolvedConnection, SharedFace};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::core_types::Axis;
use crate::error::{GridError, GridResult};
use crate::grid::index::to_indices;
use crate::grid::{Face, GridIndex};
use crate::store::{paths, TableStore};

/// Direction of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Across an I face (code 1)
    I,
    /// Across a J face (code 2)
    J,
    /// Across a K face (code 3)
    K,
    /// Between a matrix cell and its fracture counterpart (code 4)
    MatrixFracture,
}

impl ConnectionKind {
    pub const ALL: [ConnectionKind; 4] = [
        ConnectionKind::I,
        ConnectionKind::J,
        ConnectionKind::K,
        ConnectionKind::MatrixFracture,
    ];

    /// Kind from its stored direction code.
    ///
    /// # Errors
    /// `OutOfRange` unless `code` is 1..=4.
    pub fn from_code(code: i64) -> GridResult<Self> {
        match code {
            1 => Ok(ConnectionKind::I),
            2 => Ok(ConnectionKind::J),
            3 => Ok(ConnectionKind::K),
            4 => Ok(ConnectionKind::MatrixFracture),
            _ => Err(GridError::out_of_range("connection direction", code, 4)),
        }
    }

    /// Stored direction code (1=I, 2=J, 3=K, 4=matrix-fracture)
    pub const fn code(self) -> u8 {
        match self {
            ConnectionKind::I => 1,
            ConnectionKind::J => 2,
            ConnectionKind::K => 3,
            ConnectionKind::MatrixFracture => 4,
        }
    }

    /// Structured axis used for ordering and face selection.
    /// Matrix-fracture connections use K.
    pub const fn axis(self) -> Axis {
        match self {
            ConnectionKind::I => Axis::I,
            ConnectionKind::J => Axis::J,
            ConnectionKind::K | ConnectionKind::MatrixFracture => Axis::K,
        }
    }

    /// Faces involved: `cell_i`'s `+` face and `cell_j`'s `-` face along [`Self::axis`]
    pub const fn faces(self) -> (Face, Face) {
        let axis = self.axis();
        (Face::positive(axis), Face::negative(axis))
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionKind::I => "I",
            ConnectionKind::J => "J",
            ConnectionKind::K => "K",
            ConnectionKind::MatrixFracture => "MF",
        })
    }
}

/// A connection between two complete cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Downstream cell (complete index)
    pub cell_i: usize,
    /// Upstream cell (complete index)
    pub cell_j: usize,
    pub kind: ConnectionKind,
}

impl Connection {
    pub const fn new(cell_i: usize, cell_j: usize, kind: ConnectionKind) -> Self {
        Connection {
            cell_i,
            cell_j,
            kind,
        }
    }

    /// Same connection with the cells swapped
    pub const fn reversed(&self) -> Self {
        Connection::new(self.cell_j, self.cell_i, self.kind)
    }
}

/// Order a pair of complete cells so the first has the smaller (or equal)
/// coordinate along `kind`'s axis, or is the matrix cell of a
/// matrix-fracture pair. Ties keep the input order.
///
/// # Errors
/// `OutOfRange` for cells outside the grid.
pub fn canonicalize(
    index: &GridIndex,
    cell_a: usize,
    cell_b: usize,
    kind: ConnectionKind,
) -> GridResult<Connection> {
    let a = index.linear_to_structured(cell_a)?;
    let b = index.linear_to_structured(cell_b)?;
    let (a, b) = match kind {
        ConnectionKind::MatrixFracture => (a.element.number(), b.element.number()),
        _ => (a.along(kind.axis()), b.along(kind.axis())),
    };
    Ok(if a <= b {
        Connection::new(cell_a, cell_b, kind)
    } else {
        Connection::new(cell_b, cell_a, kind)
    })
}

/// Read the raw connection table and canonicalize it.
///
/// # Errors
/// Missing or malformed connection tables, cells outside the active set,
/// unknown direction codes.
pub fn read_connections<S: TableStore + ?Sized>(
    store: &S,
    index: &GridIndex,
) -> GridResult<Vec<Connection>> {
    let cell_1 = store.int_table(paths::CONNECTION_CELL_1)?;
    let cell_2 = store.int_table(paths::CONNECTION_CELL_2)?;
    let direction = store.int_table(paths::CONNECTION_DIRECTION)?;

    if cell_1.len() != cell_2.len() || cell_1.len() != direction.len() {
        return Err(GridError::malformed(
            paths::CONNECTION_DIRECTION,
            format!(
                "connection tables differ in length ({}, {}, {})",
                cell_1.len(),
                cell_2.len(),
                direction.len()
            ),
        ));
    }

    let active_1 = to_indices(paths::CONNECTION_CELL_1, cell_1)?;
    let active_2 = to_indices(paths::CONNECTION_CELL_2, cell_2)?;
    let complete_1 = index.active_to_complete_many(&active_1)?;
    let complete_2 = index.active_to_complete_many(&active_2)?;

    let mut swapped = 0usize;
    let connections = complete_1
        .iter()
        .zip(&complete_2)
        .zip(direction)
        .map(|((&a, &b), &code)| {
            let conn = canonicalize(index, a, b, ConnectionKind::from_code(code)?)?;
            if conn.cell_i != a {
                swapped += 1;
            }
            Ok(conn)
        })
        .collect::<GridResult<Vec<_>>>()?;

    info!("Read {} connections", connections.len());
    debug!("{} connections reordered downstream-first", swapped);
    Ok(connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_kind_codes() {
        for kind in ConnectionKind::ALL {
            assert_eq!(ConnectionKind::from_code(i64::from(kind.code())).unwrap(), kind);
        }
        assert!(ConnectionKind::from_code(0).is_err());
        assert!(ConnectionKind::from_code(5).is_err());
        assert_eq!(ConnectionKind::MatrixFracture.faces(), (Face::KPlus, Face::KMinus));
        assert_eq!(ConnectionKind::J.faces(), (Face::JPlus, Face::JMinus));
    }

    #[test]
    fn test_canonicalize_orders_along_axis() {
        let index = GridIndex::all_active(2, 2, 2).unwrap();
        // cell 4 = (2,2,1), cell 2 = (2,1,1)
        let c = canonicalize(&index, 4, 2, ConnectionKind::J).unwrap();
        assert_eq!((c.cell_i, c.cell_j), (2, 4));
        let c = canonicalize(&index, 2, 4, ConnectionKind::J).unwrap();
        assert_eq!((c.cell_i, c.cell_j), (2, 4));
        // Equal coordinates along the axis keep the input order
        let c = canonicalize(&index, 4, 2, ConnectionKind::I).unwrap();
        assert_eq!((c.cell_i, c.cell_j), (4, 2));
    }

    #[test]
    fn test_canonicalize_puts_matrix_first() {
        // 1x1x1 with its fracture: cell 1 matrix, cell 2 fracture
        let index = GridIndex::new(1, 1, 1, vec![1, 2]).unwrap();
        for (a, b) in [(2, 1), (1, 2)] {
            let c = canonicalize(&index, a, b, ConnectionKind::MatrixFracture).unwrap();
            assert_eq!((c.cell_i, c.cell_j), (1, 2));
        }
    }

    #[test]
    fn test_read_translates_active_indices() {
        let mut store = MemoryStore::new();
        store.insert_ints(paths::NI, vec![3]);
        store.insert_ints(paths::NJ, vec![1]);
        store.insert_ints(paths::NK, vec![1]);
        // complete cell 2 inactive
        store.insert_ints(paths::ACTIVE_INDEX, vec![1, 3]);
        store.insert_ints(paths::CONNECTION_CELL_1, vec![2]);
        store.insert_ints(paths::CONNECTION_CELL_2, vec![1]);
        store.insert_ints(paths::CONNECTION_DIRECTION, vec![1]);
        let index = GridIndex::from_store(&store).unwrap();

        let conns = read_connections(&store, &index).unwrap();
        assert_eq!(conns, vec![Connection::new(1, 3, ConnectionKind::I)]);
    }

    #[test]
    fn test_read_rejects_bad_tables() {
        let mut store = MemoryStore::new();
        store.insert_ints(paths::NI, vec![2]);
        store.insert_ints(paths::NJ, vec![1]);
        store.insert_ints(paths::NK, vec![1]);
        store.insert_ints(paths::ACTIVE_INDEX, vec![1, 2]);
        store.insert_ints(paths::CONNECTION_CELL_1, vec![1, 1]);
        store.insert_ints(paths::CONNECTION_CELL_2, vec![2]);
        store.insert_ints(paths::CONNECTION_DIRECTION, vec![1]);
        let index = GridIndex::from_store(&store).unwrap();
        assert!(matches!(
            read_connections(&store, &index),
            Err(GridError::MalformedTable { .. })
        ));

        store.insert_ints(paths::CONNECTION_CELL_1, vec![1]);
        store.insert_ints(paths::CONNECTION_DIRECTION, vec![7]);
        assert!(matches!(
            read_connections(&store, &index),
            Err(GridError::OutOfRange { .. })
        ));

        store.insert_ints(paths::CONNECTION_DIRECTION, vec![1]);
        store.insert_ints(paths::CONNECTION_CELL_2, vec![3]);
        assert!(read_connections(&store, &index).is_err());
    }
}
