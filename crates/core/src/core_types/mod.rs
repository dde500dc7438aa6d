//! Core types shared across the grid modules

pub mod cell;
pub mod vec3;

pub use cell::{Axis, CellCoord, Element, IndexDomain};
pub use vec3::Vec3;
