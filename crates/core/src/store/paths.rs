//! Table paths of the grid section of a simulation results file

/// Prefix of every static grid table
pub const GRID_PREFIX: &str = "SpatialProperties/000000/GRID/";

/// Number of cells along I (1-element integer table)
pub const NI: &str = "SpatialProperties/000000/GRID/IGNTID";
/// Number of cells along J
pub const NJ: &str = "SpatialProperties/000000/GRID/IGNTJD";
/// Number of cells along K
pub const NK: &str = "SpatialProperties/000000/GRID/IGNTKD";

/// Active → complete index map, 1-based, ascending
pub const ACTIVE_INDEX: &str = "SpatialProperties/000000/GRID/IPSTCS";

/// Per-cell 8-node blocks, 1-based node numbers
pub const BLOCKS: &str = "SpatialProperties/000000/GRID/BLOCKS";
/// Node coordinates, 3 values per node
pub const NODES: &str = "SpatialProperties/000000/GRID/NODES";

/// Regular-grid node X coordinates, one per node
pub const X_CORNERS: &str = "SpatialProperties/000000/GRID/XCORNCRCN";
/// Regular-grid node Y coordinates
pub const Y_CORNERS: &str = "SpatialProperties/000000/GRID/YCORNCRCN";
/// Regular-grid node Z coordinates
pub const Z_CORNERS: &str = "SpatialProperties/000000/GRID/ZCORNCRCN";

/// First cell of each connection (active index)
pub const CONNECTION_CELL_1: &str = "SpatialProperties/000000/GRID/ICTPS1";
/// Second cell of each connection (active index)
pub const CONNECTION_CELL_2: &str = "SpatialProperties/000000/GRID/ICTPS2";
/// Direction code of each connection (1=I, 2=J, 3=K, 4=matrix-fracture)
pub const CONNECTION_DIRECTION: &str = "SpatialProperties/000000/GRID/ICNTDR";

/// Permeability along I
pub const PERM_I: &str = "PERMI";
/// Permeability along J
pub const PERM_J: &str = "PERMJ";
/// Permeability along K
pub const PERM_K: &str = "PERMK";
/// Net-to-gross ratio
pub const NET_TO_GROSS: &str = "NET/GROSS";

/// Table path of grid property `name`, with `/` escaped as `%2F`
pub fn property(name: &str) -> String {
    format!("{GRID_PREFIX}{}", name.replace('/', "%2F"))
}
