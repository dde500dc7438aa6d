//! Structured cell coordinates and numbering domains

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GridError, GridResult};

/// Porosity element a cell belongs to
///
/// Dual-porosity grids carry a fracture counterpart for every matrix cell,
/// numbered after the whole matrix block. Grids without fractures only ever
/// produce `Matrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Rock matrix cell (element 1)
    Matrix,
    /// Fracture network cell (element 2)
    Fracture,
}

impl Element {
    /// 1-based element number used in linear index arithmetic
    #[inline]
    pub const fn number(self) -> usize {
        match self {
            Element::Matrix => 1,
            Element::Fracture => 2,
        }
    }

    /// Element from its 1-based number.
    ///
    /// # Errors
    /// `OutOfRange` unless `n` is 1 or 2.
    pub fn from_number(n: usize) -> GridResult<Self> {
        match n {
            1 => Ok(Element::Matrix),
            2 => Ok(Element::Fracture),
            _ => Err(GridError::out_of_range("element", n as i64, 2)),
        }
    }
}

/// Structural axis of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// First index direction
    I,
    /// Second index direction
    J,
    /// Third (layer) index direction
    K,
}

impl Axis {
    /// All axes in I, J, K order
    pub const ALL: [Axis; 3] = [Axis::I, Axis::J, Axis::K];

    /// 0-based position of the axis (I=0, J=1, K=2)
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::I => 0,
            Axis::J => 1,
            Axis::K => 2,
        }
    }
}

/// Structured (I, J, K, element) coordinate of a cell, all 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub element: Element,
}

impl CellCoord {
    /// Matrix cell at (i, j, k)
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        CellCoord {
            i,
            j,
            k,
            element: Element::Matrix,
        }
    }

    /// Cell at (i, j, k) in the given element
    pub const fn with_element(i: usize, j: usize, k: usize, element: Element) -> Self {
        CellCoord { i, j, k, element }
    }

    /// Coordinate along `axis`
    #[inline]
    pub const fn along(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.i,
            Axis::J => self.j,
            Axis::K => self.k,
        }
    }

    /// Manhattan distance over (i, j, k, element)
    pub fn manhattan_distance(&self, other: &CellCoord) -> usize {
        self.i.abs_diff(other.i)
            + self.j.abs_diff(other.j)
            + self.k.abs_diff(other.k)
            + self.element.number().abs_diff(other.element.number())
    }
}

/// Renders as `"I J K"`, the layout used in connection override decks.
impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.i, self.j, self.k)
    }
}

/// Cell numbering space a per-cell array or index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexDomain {
    /// Every geometric cell, active or not
    Complete,
    /// Only simulated cells, in ascending complete-index order
    Active,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_numbers() {
        assert_eq!(Element::Matrix.number(), 1);
        assert_eq!(Element::from_number(2).unwrap(), Element::Fracture);
        assert!(matches!(
            Element::from_number(3),
            Err(GridError::OutOfRange { what: "element", .. })
        ));
    }

    #[test]
    fn test_manhattan_distance_counts_element() {
        let m = CellCoord::new(2, 3, 4);
        let f = CellCoord::with_element(2, 3, 4, Element::Fracture);
        assert_eq!(m.manhattan_distance(&f), 1);
        assert_eq!(m.manhattan_distance(&CellCoord::new(3, 4, 4)), 2);
    }

    #[test]
    fn test_display_omits_element() {
        let c = CellCoord::with_element(1, 2, 3, Element::Fracture);
        assert_eq!(c.to_string(), "1 2 3");
    }
}
