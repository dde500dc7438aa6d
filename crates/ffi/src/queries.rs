use resgrid_core::{Connection, EngineConfig, Face, GridSizes};
use std::ptr;

use crate::error::{DefaultResGridError, ResGridErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error};
use crate::instance::{ResGridConfig, ResGridInstance};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// FFI-friendly canonical connection.
/// Keep this layout stable for C/C++/C# consumers.
pub struct ResGridConnection {
    /// Downstream cell, 1-based complete index.
    pub cell_i: usize,
    /// Upstream cell, 1-based complete index.
    pub cell_j: usize,
    /// 1=I, 2=J, 3=K, 4=matrix-fracture.
    pub direction: u8,
}

impl From<&Connection> for ResGridConnection {
    fn from(connection: &Connection) -> Self {
        Self {
            cell_i: connection.cell_i,
            cell_j: connection.cell_j,
            direction: connection.kind.code(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Grid size facts.
pub struct ResGridSizes {
    pub ni: usize,
    pub nj: usize,
    pub nk: usize,
    pub n_cells: usize,
    pub n_matrix: usize,
    pub n_fracture: usize,
    pub n_active: usize,
    pub n_active_matrix: usize,
    pub n_active_fracture: usize,
}

impl From<&GridSizes> for ResGridSizes {
    fn from(sizes: &GridSizes) -> Self {
        Self {
            ni: sizes.ni,
            nj: sizes.nj,
            nk: sizes.nk,
            n_cells: sizes.n_cells,
            n_matrix: sizes.n_matrix,
            n_fracture: sizes.n_fracture,
            n_active: sizes.n_active,
            n_active_matrix: sizes.n_active_matrix,
            n_active_fracture: sizes.n_active_fracture,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// A 3-D point.
pub struct ResGridPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[no_mangle]
/// Return a borrowed pointer to the canonical connection list.
///
/// The list is read on first use and cached by the engine. The returned
/// pointer is valid until the next call to this function on the same
/// instance. **DO NOT FREE THIS POINTER**.
///
/// Returns
/// - `ResGridErrorCode::Ok` (0) with the array in `out_array` and its length in `out_len`
/// - `NullPointer` if `ptr`, `out_len` or `out_array` is null
/// - `LockPoisoned`, `MissingTable`, `MalformedTable`, `OutOfRange` on failure
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `resgrid_new` or null.
/// - `out_len` and `out_array` must be valid, non-null, writable pointers.
///
/// # Example Usage (C++)
/// ```cpp
/// uintptr_t len = 0;
/// const ResGridConnection* conns = nullptr;
/// if (resgrid_get_connections(grid, &len, &conns) == ResGridErrorCode::Ok) {
///     for (uintptr_t i = 0; i < len; i++) { /* conns[i] */ }
/// }
/// ```
pub unsafe extern "C" fn resgrid_get_connections(
    ptr: *const ResGridInstance,
    out_len: *mut usize,
    out_array: *mut *const ResGridConnection,
) -> ResGridErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultResGridError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut snapshot = instance
            .connection_snapshot
            .lock()
            .map_err(|_| DefaultResGridError::lock_poisoned("connection_snapshot"))?;
        let mut engine = instance
            .engine
            .write()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?;

        snapshot.clear();
        snapshot.extend(engine.connections()?.iter().map(ResGridConnection::from));

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok(())
    });

    // Set to null on error (per documentation contract)
    if result != ResGridErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }
    result
}

#[no_mangle]
/// Return a borrowed pointer to the transmissibilities, aligned with
/// `resgrid_get_connections`.
///
/// Computed on first use or when `force_recompute` is set; cached otherwise.
/// A failing connection fails the whole call. The returned pointer is valid
/// until the next call to this function on the same instance.
/// **DO NOT FREE THIS POINTER**.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `resgrid_new` or null.
/// - `out_len` and `out_array` must be valid, non-null, writable pointers.
pub unsafe extern "C" fn resgrid_get_transmissibilities(
    ptr: *const ResGridInstance,
    force_recompute: bool,
    out_len: *mut usize,
    out_array: *mut *const f64,
) -> ResGridErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultResGridError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut snapshot = instance
            .transmissibility_snapshot
            .lock()
            .map_err(|_| DefaultResGridError::lock_poisoned("transmissibility_snapshot"))?;
        let mut engine = instance
            .engine
            .write()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?;

        snapshot.clear();
        snapshot.extend_from_slice(engine.transmissibilities(force_recompute)?);

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok(())
    });

    if result != ResGridErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }
    result
}

#[no_mangle]
/// Drop the engine's cached connections and transmissibilities.
///
/// Previously returned snapshot pointers stay valid until the next query.
pub extern "C" fn resgrid_invalidate(ptr: *const ResGridInstance) -> ResGridErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        instance
            .engine
            .write()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?
            .invalidate();
        Ok(())
    })
}

#[no_mangle]
/// Replace the engine tolerances. Cached results are kept until
/// `resgrid_invalidate` or a forced recompute.
pub extern "C" fn resgrid_set_config(
    ptr: *const ResGridInstance,
    config: ResGridConfig,
) -> ResGridErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        instance
            .engine
            .write()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?
            .set_config(EngineConfig::from(config))?;
        Ok(())
    })
}

#[no_mangle]
/// Fill `out_sizes` with the grid size facts.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `resgrid_new` or null.
/// - `out_sizes` must be a valid, non-null pointer to a `ResGridSizes`.
pub unsafe extern "C" fn resgrid_get_sizes(
    ptr: *const ResGridInstance,
    out_sizes: *mut ResGridSizes,
) -> ResGridErrorCode {
    if out_sizes.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_sizes"));
    }
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let engine = instance
            .engine
            .read()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?;
        unsafe {
            *out_sizes = ResGridSizes::from(engine.index().sizes());
        }
        Ok(())
    })
}

#[no_mangle]
/// Center of complete cell `cell`, or of one of its faces.
///
/// - `face`: -1 for the whole cell, 0..=5 for I-, I+, J-, J+, K-, K+.
///
/// Returns `InvalidFace` for any other face number and `OutOfRange` for an
/// unknown cell.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `resgrid_new` or null.
/// - `out_point` must be a valid, non-null pointer to a `ResGridPoint`.
pub unsafe extern "C" fn resgrid_cell_center(
    ptr: *const ResGridInstance,
    cell: usize,
    face: i32,
    out_point: *mut ResGridPoint,
) -> ResGridErrorCode {
    if out_point.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_point"));
    }
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let face = match face {
            -1 => None,
            n => Some(
                usize::try_from(n)
                    .map_err(|_| resgrid_core::GridError::InvalidFace(n.to_string()))
                    .and_then(Face::try_from)?,
            ),
        };
        let engine = instance
            .engine
            .read()
            .map_err(|_| DefaultResGridError::lock_poisoned("engine"))?;
        let center = engine.cell_center(cell, face)?;
        unsafe {
            *out_point = ResGridPoint {
                x: center.x,
                y: center.y,
                z: center.z,
            };
        }
        Ok(())
    })
}

#[no_mangle]
/// Release the connection and transmissibility snapshot buffers.
///
/// Pointers previously returned by `resgrid_get_connections` and
/// `resgrid_get_transmissibilities` become dangling. Engine caches are kept.
///
/// Returns
/// - `ResGridErrorCode::Ok` (0) on success
/// - `NullPointer` if `ptr` is null
pub extern "C" fn resgrid_clear_snapshots(ptr: *const ResGridInstance) -> ResGridErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut connections = instance
            .connection_snapshot
            .lock()
            .map_err(|_| DefaultResGridError::lock_poisoned("connection_snapshot"))?;
        connections.clear();
        connections.shrink_to_fit();
        let mut transmissibilities = instance
            .transmissibility_snapshot
            .lock()
            .map_err(|_| DefaultResGridError::lock_poisoned("transmissibility_snapshot"))?;
        transmissibilities.clear();
        transmissibilities.shrink_to_fit();
        Ok(())
    })
}
