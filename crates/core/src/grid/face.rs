//! Cell faces and their corner-node permutations
//!
//! Node numbering of a cell block (K grows downward):
//!
//! ```text
//!             K-
//!         0--------1            x--> I
//!        /|       /|           /|
//!       / |      / |          / |
//!      /  |  J- /  |         v  v
//!     3--------2   |        J   K
//!     |   |    |   |
//! I-  |   4----|---5  I+
//!     |  / J+  |  /
//!     | /      | /
//!     |/       |/
//!     7--------6
//!         K+
//! ```
//!
//! Each face lists its nodes so that the fan-triangulated normal points
//! along the positive I, J or K direction. For I and J faces, vertices 0 and
//! 3 lie on the upper (K-) edge and vertices 1 and 2 on the lower (K+) edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core_types::Axis;
use crate::error::GridError;

/// Node positions of each face within the 8-node block, indexed by [`Face::index`]
pub const FACE_NODES: [[usize; 4]; 6] = [
    [3, 7, 4, 0], // I-
    [2, 6, 5, 1], // I+
    [0, 4, 5, 1], // J-
    [3, 7, 6, 2], // J+
    [0, 1, 2, 3], // K-
    [4, 5, 6, 7], // K+
];

/// One of the six faces of a hexahedral cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    IMinus,
    IPlus,
    JMinus,
    JPlus,
    KMinus,
    KPlus,
}

impl Face {
    /// All faces in index order
    pub const ALL: [Face; 6] = [
        Face::IMinus,
        Face::IPlus,
        Face::JMinus,
        Face::JPlus,
        Face::KMinus,
        Face::KPlus,
    ];

    /// 0-based face number (I-=0 … K+=5)
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Face::IMinus => 0,
            Face::IPlus => 1,
            Face::JMinus => 2,
            Face::JPlus => 3,
            Face::KMinus => 4,
            Face::KPlus => 5,
        }
    }

    /// Face from its 0-based number.
    ///
    /// # Errors
    /// `InvalidFace` for numbers above 5.
    pub fn from_index(index: usize) -> Result<Face, GridError> {
        Face::ALL
            .get(index)
            .copied()
            .ok_or_else(|| GridError::InvalidFace(index.to_string()))
    }

    /// Block node positions of this face
    #[inline]
    pub const fn nodes(self) -> [usize; 4] {
        FACE_NODES[self.index()]
    }

    /// Axis the face is normal to
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Face::IMinus | Face::IPlus => Axis::I,
            Face::JMinus | Face::JPlus => Axis::J,
            Face::KMinus | Face::KPlus => Axis::K,
        }
    }

    /// True for the `+` side of its axis
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Face::IPlus | Face::JPlus | Face::KPlus)
    }

    /// `+` face along `axis`
    pub const fn positive(axis: Axis) -> Face {
        match axis {
            Axis::I => Face::IPlus,
            Axis::J => Face::JPlus,
            Axis::K => Face::KPlus,
        }
    }

    /// `-` face along `axis`
    pub const fn negative(axis: Axis) -> Face {
        match axis {
            Axis::I => Face::IMinus,
            Axis::J => Face::JMinus,
            Axis::K => Face::KMinus,
        }
    }

    /// Short label, e.g. `"I+"`
    pub const fn label(self) -> &'static str {
        match self {
            Face::IMinus => "I-",
            Face::IPlus => "I+",
            Face::JMinus => "J-",
            Face::JPlus => "J+",
            Face::KMinus => "K-",
            Face::KPlus => "K+",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a label (`"I-"`, case-insensitive) or a face number (`"0"`..`"5"`).
impl FromStr for Face {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if let Some(face) = Face::ALL
            .iter()
            .find(|f| f.label().eq_ignore_ascii_case(key))
        {
            return Ok(*face);
        }
        key.parse::<usize>()
            .ok()
            .and_then(|n| Face::ALL.get(n).copied())
            .ok_or_else(|| GridError::InvalidFace(s.to_string()))
    }
}

impl TryFrom<usize> for Face {
    type Error = GridError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Face::from_index(index)
    }
}
