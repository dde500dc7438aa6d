use resgrid_core::{ConnectionEngine, EngineConfig, MemoryStore};
use std::ptr;
use std::sync::{Mutex, RwLock};

use crate::error::{DefaultResGridError, ResGridErrorCode};
use crate::helpers::{clear_last_error, track_error, track_result};
use crate::queries::ResGridConnection;
use crate::store::ResGridStore;

/// Engine tolerances, mirrored from `EngineConfig`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResGridConfig {
    /// Coincidence / skew tolerance in grid length units.
    pub epsilon: f64,
    /// Multiplier applied to vertical differences before distance tests.
    pub z_scale: f64,
    /// Rescale shared-face normals to the summed fan-triangle area.
    pub precise_area: bool,
}

impl From<ResGridConfig> for EngineConfig {
    fn from(config: ResGridConfig) -> Self {
        EngineConfig {
            epsilon: config.epsilon,
            z_scale: config.z_scale,
            precise_area: config.precise_area,
        }
    }
}

impl From<EngineConfig> for ResGridConfig {
    fn from(config: EngineConfig) -> Self {
        ResGridConfig {
            epsilon: config.epsilon,
            z_scale: config.z_scale,
            precise_area: config.precise_area,
        }
    }
}

/// Default engine configuration (epsilon 1, z scale 100, plain area).
#[no_mangle]
pub extern "C" fn resgrid_default_config() -> ResGridConfig {
    EngineConfig::default().into()
}

/// Connection engine over one grid.
///
/// # Thread Safety
/// The engine is protected by an `RwLock`: geometry queries take a read lock,
/// calls that fill the connection or transmissibility caches take the write
/// lock. Each array query copies its result into its own `Mutex`-protected
/// snapshot buffer and returns a borrowed pointer into it.
pub struct ResGridInstance {
    pub(crate) engine: RwLock<ConnectionEngine<MemoryStore>>,
    /// Reused by `resgrid_get_connections`.
    pub(crate) connection_snapshot: Mutex<Vec<ResGridConnection>>,
    /// Reused by `resgrid_get_transmissibilities`.
    pub(crate) transmissibility_snapshot: Mutex<Vec<f64>>,
}

impl ResGridInstance {
    /// Build the engine, taking the store's tables.
    ///
    /// # Errors
    /// Any engine construction failure, converted to its FFI code.
    pub(crate) fn new(store: MemoryStore, config: EngineConfig) -> Result<Box<Self>, DefaultResGridError> {
        let engine = ConnectionEngine::new(store, config)?;
        Ok(Box::new(Self {
            engine: RwLock::new(engine),
            connection_snapshot: Mutex::new(Vec::new()),
            transmissibility_snapshot: Mutex::new(Vec::new()),
        }))
    }
}

/// Create an engine from a filled store and return it via out-parameter.
///
/// The store is consumed whether or not creation succeeds; do not use or
/// destroy it afterwards.
///
/// Parameters
/// - `store`: store from `resgrid_store_new*`. Must be non-null.
/// - `config`: tolerances, or null for `resgrid_default_config()`.
/// - `out_instance`: receives the engine on success, null on failure.
///
/// Returns
/// - `ResGridErrorCode::Ok` (0) on success
/// - `NullPointer`, `InvalidConfig`, `MissingTable`, `MalformedTable`, ... on failure
///
/// # Safety
/// - `store` must be a live pointer from `resgrid_store_new*`.
/// - `config`, if non-null, must point to a valid `ResGridConfig`.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller MUST call `resgrid_destroy` exactly once on the returned instance.
///
/// Example (C++)
/// ```cpp
/// ResGridInstance* grid = nullptr;
/// if (resgrid_new(store, nullptr, &grid) != ResGridErrorCode::Ok) {
///     fprintf(stderr, "%s\n", resgrid_get_last_error());
///     return;
/// }
/// // ... use grid ...
/// resgrid_destroy(grid);
/// ```
#[no_mangle]
pub unsafe extern "C" fn resgrid_new(
    store: *mut ResGridStore,
    config: *const ResGridConfig,
    out_instance: *mut *mut ResGridInstance,
) -> ResGridErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_instance"));
    }
    if store.is_null() {
        unsafe {
            *out_instance = ptr::null_mut();
        }
        return track_error(&DefaultResGridError::null_pointer("store"));
    }

    // SAFETY: non-null store pointers come from `Box::into_raw`
    let store = unsafe { Box::from_raw(store) };
    // SAFETY: checked non-null by `as_ref`
    let config = unsafe { config.as_ref() }
        .copied()
        .map_or_else(EngineConfig::default, EngineConfig::from);

    match track_result(ResGridInstance::new(store.store, config)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            clear_last_error();
            ResGridErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy an engine created by `resgrid_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `resgrid_new` and not freed already.
/// - Pointers previously returned by query functions become dangling.
#[no_mangle]
pub unsafe extern "C" fn resgrid_destroy(ptr: *mut ResGridInstance) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: created by `Box::into_raw` in `resgrid_new`
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
