//! Grid numbering, faces and corner-node geometry

pub mod coordinates;
pub mod face;
pub mod index;

// Re-export main types
pub use coordinates::{GeometryKind, GeometrySource, GridCoordinates};
pub use face::{Face, FACE_NODES};
pub use index::{GridIndex, GridSizes, INACTIVE};
