//! Connection engine: owns one grid's tables and memoizes its connection list
//! and transmissibilities
//!
//! Both caches fill on first use and are only cleared by
//! [`ConnectionEngine::invalidate`] or a forced recompute. Changing the
//! configuration does not clear them either.

use tracing::info;

use crate::config::EngineConfig;
use crate::connections::{read_connections, Connection, FaceResolver, ResolvedConnection};
use crate::core_types::Vec3;
use crate::error::{GridError, GridResult};
use crate::grid::{Face, GridCoordinates, GridIndex};
use crate::store::TableStore;
use crate::transmissibility::{CellProperties, TransmissibilityCalculator};

/// Engine over one grid held in a [`TableStore`]
#[derive(Debug)]
pub struct ConnectionEngine<S: TableStore> {
    store: S,
    index: GridIndex,
    coordinates: GridCoordinates,
    config: EngineConfig,
    connections: Option<Vec<Connection>>,
    transmissibilities: Option<Vec<f64>>,
}

impl<S: TableStore> ConnectionEngine<S> {
    /// Read the grid index and geometry from `store`.
    ///
    /// # Errors
    /// `InvalidConfig` for bad tolerances, or any missing or malformed grid table.
    pub fn new(store: S, config: EngineConfig) -> GridResult<Self> {
        config.validate()?;
        let index = GridIndex::from_store(&store)?;
        let coordinates = GridCoordinates::from_store(&store, &index)?;

        let sizes = index.sizes();
        info!(
            "Connection engine for {}x{}x{} grid: {} active of {} cells{}",
            sizes.ni,
            sizes.nj,
            sizes.nk,
            sizes.n_active,
            sizes.n_cells,
            if index.has_fracture() { " (dual porosity)" } else { "" }
        );

        Ok(ConnectionEngine {
            store,
            index,
            coordinates,
            config,
            connections: None,
            transmissibilities: None,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &GridIndex {
        &self.index
    }

    pub fn coordinates(&self) -> &GridCoordinates {
        &self.coordinates
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration for later computations. Cached results are
    /// kept; call [`Self::invalidate`] to recompute them with the new values.
    ///
    /// # Errors
    /// `InvalidConfig` for bad tolerances; the old configuration stays.
    pub fn set_config(&mut self, config: EngineConfig) -> GridResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Drop the cached connection list and transmissibilities
    pub fn invalidate(&mut self) {
        self.connections = None;
        self.transmissibilities = None;
    }

    /// Canonical connection list, read on first use.
    ///
    /// # Errors
    /// Missing or malformed connection tables.
    pub fn connections(&mut self) -> GridResult<&[Connection]> {
        if self.connections.is_none() {
            self.connections = Some(read_connections(&self.store, &self.index)?);
        }
        Ok(self.connections.as_deref().unwrap_or_default())
    }

    /// Transmissibility of every connection in [`Self::connections`],
    /// computed on first use or when `force_recompute` is set.
    ///
    /// # Errors
    /// Any failure reading properties or resolving a connection; the cache is
    /// left untouched.
    pub fn transmissibilities(&mut self, force_recompute: bool) -> GridResult<&[f64]> {
        if self.transmissibilities.is_none() || force_recompute {
            self.connections()?;
            let connections = self.connections.as_deref().unwrap_or_default();
            let values = self.transmissibilities_for(connections)?;
            self.transmissibilities = Some(values);
        }
        Ok(self.transmissibilities.as_deref().unwrap_or_default())
    }

    /// Transmissibilities of an arbitrary connection list. Caches are not used.
    ///
    /// # Errors
    /// Any failure reading properties or resolving a connection.
    pub fn transmissibilities_for(&self, connections: &[Connection]) -> GridResult<Vec<f64>> {
        let properties = CellProperties::from_store(&self.store, &self.index)?;
        TransmissibilityCalculator::new(&self.coordinates, &properties, &self.config)
            .compute(connections)
    }

    fn resolver(&self) -> FaceResolver {
        FaceResolver::from_config(&self.config)
    }

    /// Both cell faces and the shared face of `connection`.
    ///
    /// # Errors
    /// Unknown cells or unresolvable faces.
    pub fn connection_geometry(&self, connection: &Connection) -> GridResult<ResolvedConnection> {
        self.resolver().resolve(&self.coordinates, connection)
    }

    /// [`Self::connection_geometry`] for a batch, in input order.
    ///
    /// # Errors
    /// The first connection that fails to resolve.
    pub fn resolve_many(&self, connections: &[Connection]) -> GridResult<Vec<ResolvedConnection>> {
        self.resolver().resolve_many(&self.coordinates, connections)
    }

    /// Corner nodes of complete cell `cell`, or of one of its faces.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn cell_nodes(&self, cell: usize, face: Option<Face>) -> GridResult<Vec<Vec3>> {
        self.coordinates.nodes_of_cell(cell, face)
    }

    /// Center of complete cell `cell`, or of one of its faces.
    ///
    /// # Errors
    /// `OutOfRange` for an unknown cell.
    pub fn cell_center(&self, cell: usize, face: Option<Face>) -> GridResult<Vec3> {
        self.coordinates.center_of(cell, face)
    }

    /// Connection override records, `" I J K   I J K   T"` per connection.
    ///
    /// Transmissibilities are computed when not supplied.
    ///
    /// # Errors
    /// `OutOfRange` if `transmissibilities` does not match `connections` in
    /// length, or any failure computing them.
    pub fn sconnect_records(
        &self,
        connections: &[Connection],
        transmissibilities: Option<&[f64]>,
    ) -> GridResult<Vec<String>> {
        let computed;
        let values = match transmissibilities {
            Some(values) => {
                if values.len() != connections.len() {
                    return Err(GridError::OutOfRange {
                        what: "transmissibility count",
                        value: values.len() as i64,
                        min: connections.len() as i64,
                        max: connections.len() as i64,
                    });
                }
                values
            }
            None => {
                computed = self.transmissibilities_for(connections)?;
                &computed[..]
            }
        };

        connections
            .iter()
            .zip(values)
            .map(|(c, t)| {
                let ci = self.index.linear_to_structured(c.cell_i)?;
                let cj = self.index.linear_to_structured(c.cell_j)?;
                Ok(format!(" {ci}   {cj}   {t}"))
            })
            .collect()
    }
}
