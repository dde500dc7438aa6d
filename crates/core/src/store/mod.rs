//! Keyed table store the engine reads its raw grid tables from
//!
//! The on-disk file format is someone else's problem: anything that can hand
//! back a typed array for a table path (or say it has none) can drive the
//! engine. [`MemoryStore`] is the in-process implementation used by the
//! tests, the C ABI and the headless tools.

pub mod builder;
pub mod paths;

pub use builder::{Fault, GridStoreBuilder};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::warn;

use crate::core_types::IndexDomain;
use crate::error::{GridError, GridResult};
use crate::grid::GridIndex;

/// A typed array stored under a table path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "lowercase")]
pub enum Table {
    /// Integer data (indices, dimensions, direction codes)
    Int(Vec<i64>),
    /// Floating-point data (coordinates, properties)
    Float(Vec<f64>),
}

impl Table {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Table::Int(v) => v.len(),
            Table::Float(v) => v.len(),
        }
    }

    /// True if the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to `f64`, borrowed when already floating point
    pub fn values_f64(&self) -> Cow<'_, [f64]> {
        match self {
            Table::Float(v) => Cow::Borrowed(v),
            Table::Int(v) => Cow::Owned(v.iter().map(|&x| x as f64).collect()),
        }
    }
}

/// Source of raw grid tables
///
/// Only [`TableStore::table`] is required. The provided methods add typed
/// access and per-cell property resolution; providers that apply unit
/// conversion or keep properties elsewhere override
/// [`TableStore::property`].
pub trait TableStore {
    /// Table stored at `path`, or `None` if absent
    fn table(&self, path: &str) -> Option<&Table>;

    /// Integer table at `path`.
    ///
    /// # Errors
    /// `MissingTable` if absent, `MalformedTable` if it holds floats.
    fn int_table(&self, path: &str) -> GridResult<&[i64]> {
        match self.table(path) {
            Some(Table::Int(v)) => Ok(v),
            Some(Table::Float(_)) => Err(GridError::malformed(path, "expected integer data")),
            None => Err(GridError::MissingTable(path.to_string())),
        }
    }

    /// Floating-point table at `path`.
    ///
    /// # Errors
    /// `MissingTable` if absent, `MalformedTable` if it holds integers.
    fn float_table(&self, path: &str) -> GridResult<&[f64]> {
        match self.table(path) {
            Some(Table::Float(v)) => Ok(v),
            Some(Table::Int(_)) => Err(GridError::malformed(path, "expected float data")),
            None => Err(GridError::MissingTable(path.to_string())),
        }
    }

    /// True if a per-cell property called `name` is stored
    fn has_property(&self, name: &str) -> bool {
        self.table(&paths::property(name)).is_some()
    }

    /// Per-cell property `name` resolved to `domain`.
    ///
    /// A table with one value per complete cell is complete; one with one
    /// value per active cell is active. Scattering active data to the
    /// complete domain fills inactive cells with 0.
    ///
    /// # Errors
    /// `MissingProperty` if absent, `MalformedTable` if its size matches
    /// neither domain.
    fn property(&self, name: &str, index: &GridIndex, domain: IndexDomain) -> GridResult<Vec<f64>> {
        let path = paths::property(name);
        let table = self
            .table(&path)
            .ok_or_else(|| GridError::MissingProperty(name.to_string()))?;
        let values = table.values_f64();
        let sizes = index.sizes();

        let stored = if values.len() == sizes.n_cells {
            IndexDomain::Complete
        } else if values.len() == sizes.n_active {
            IndexDomain::Active
        } else {
            warn!(
                "Property {} has {} values; grid has {} complete / {} active cells",
                name,
                values.len(),
                sizes.n_cells,
                sizes.n_active
            );
            return Err(GridError::malformed(
                &path,
                format!(
                    "{} values match neither {} complete nor {} active cells",
                    values.len(),
                    sizes.n_cells,
                    sizes.n_active
                ),
            ));
        };

        Ok(match (stored, domain) {
            (IndexDomain::Complete, IndexDomain::Complete)
            | (IndexDomain::Active, IndexDomain::Active) => values.into_owned(),
            (IndexDomain::Complete, IndexDomain::Active) => index.gather_active(&values),
            (IndexDomain::Active, IndexDomain::Complete) => index.scatter_to_complete(&values, 0.0),
        })
    }
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn table(&self, path: &str) -> Option<&Table> {
        (**self).table(path)
    }

    fn has_property(&self, name: &str) -> bool {
        (**self).has_property(name)
    }

    fn property(&self, name: &str, index: &GridIndex, domain: IndexDomain) -> GridResult<Vec<f64>> {
        (**self).property(name, index, domain)
    }
}

/// In-memory table store keyed by path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    tables: FxHashMap<String, Table>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `table` at `path`, returning any table it replaces
    pub fn insert(&mut self, path: impl Into<String>, table: Table) -> Option<Table> {
        self.tables.insert(path.into(), table)
    }

    /// Store integer data at `path`
    pub fn insert_ints(&mut self, path: impl Into<String>, data: Vec<i64>) -> Option<Table> {
        self.insert(path, Table::Int(data))
    }

    /// Store floating-point data at `path`
    pub fn insert_floats(&mut self, path: impl Into<String>, data: Vec<f64>) -> Option<Table> {
        self.insert(path, Table::Float(data))
    }

    /// Store a per-cell property under its grid property path
    pub fn insert_property(&mut self, name: &str, values: Vec<f64>) -> Option<Table> {
        self.insert(paths::property(name), Table::Float(values))
    }

    /// Remove the table at `path`
    pub fn remove(&mut self, path: &str) -> Option<Table> {
        self.tables.remove(path)
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if no tables are stored
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Stored table paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl TableStore for MemoryStore {
    fn table(&self, path: &str) -> Option<&Table> {
        self.tables.get(path)
    }
}
