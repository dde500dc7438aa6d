//! Error type shared by every grid, geometry and transmissibility routine
//!
//! All errors are raised at the point of detection and propagate unchanged.
//! None of them are retried: they indicate bad input tables or grid geometry
//! outside the tolerances the face resolution assumes.

use thiserror::Error;

/// Errors produced by the connection and transmissibility engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Index or coordinate outside its valid bounds
    #[error("{what} {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// What was being indexed (e.g. `"cell"`, `"i"`, `"active index"`)
        what: &'static str,
        /// Offending value
        value: i64,
        /// Smallest valid value
        min: i64,
        /// Largest valid value
        max: i64,
    },

    /// Unrecognized face selector
    #[error("invalid face: {0}")]
    InvalidFace(String),

    /// No geometric overlap between two faces expected to share a connection
    #[error("faces of cells {cell_i} and {cell_j} are not connected")]
    FacesNotConnected {
        /// Downstream cell (complete index)
        cell_i: usize,
        /// Upstream cell (complete index)
        cell_j: usize,
    },

    /// Two edges that should intersect are farther apart than the tolerance
    #[error("lines are skew: closest points are {distance} apart (epsilon {epsilon})")]
    LinesSkew {
        /// Scaled distance between the closest points
        distance: f64,
        /// Tolerance in force
        epsilon: f64,
    },

    /// Degenerate intersection construction (parallel or zero-length edges)
    #[error("lines are parallel and do not intersect")]
    ParallelLines,

    /// A table required by the engine is absent from the store
    #[error("table not found: {0}")]
    MissingTable(String),

    /// A table exists but has the wrong type, size or content
    #[error("malformed table {path}: {reason}")]
    MalformedTable {
        /// Table path
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// A per-cell property is not available
    #[error("grid property not found: {0}")]
    MissingProperty(String),

    /// Configuration value rejected at engine construction
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GridError {
    /// Shorthand for a 1-based range violation.
    pub(crate) fn out_of_range(what: &'static str, value: i64, max: usize) -> Self {
        GridError::OutOfRange {
            what,
            value,
            min: 1,
            max: max as i64,
        }
    }

    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        GridError::MalformedTable {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type GridResult<T> = Result<T, GridError>;
