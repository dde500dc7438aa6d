//! Reservoir Grid Connection Library
//!
//! Face geometry and transmissibility for structured corner-point grids.
//!
//! ## Overview
//!
//! - Cell numbering across complete/active and matrix/fracture index spaces
//! - Corner-node geometry of cells and faces, from explicit tables or a
//!   regular-grid layout
//! - Shared faces of connected cells, including offset faces across faults
//!   (non-neighbour connections)
//! - Two-point harmonic transmissibility from permeability, net-to-gross and
//!   face geometry
//!
//! Raw tables come from a [`TableStore`]; [`ConnectionEngine`] ties the
//! pieces together and memoizes the connection list and transmissibilities.

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Table access
pub mod store;

// Grid numbering and geometry
pub mod geometry;
pub mod grid;

// Connections and flow
pub mod connections;
pub mod engine;
pub mod transmissibility;

// Re-export core types
pub use config::EngineConfig;
pub use core_types::{Axis, CellCoord, Element, IndexDomain, Vec3};
pub use error::{GridError, GridResult};

// Re-export store types
pub use store::{Fault, GridStoreBuilder, MemoryStore, Table, TableStore};

// Re-export grid and connection types
pub use connections::{Connection, ConnectionKind, FaceResolver, ResolvedConnection, SharedFace};
pub use engine::ConnectionEngine;
pub use grid::{Face, GeometryKind, GeometrySource, GridCoordinates, GridIndex, GridSizes};
pub use transmissibility::{CellProperties, TransmissibilityCalculator};
