use resgrid_core::{GridStoreBuilder, MemoryStore};
use std::os::raw::c_char;
use std::ptr;

use crate::error::{DefaultResGridError, ResGridErrorCode};
use crate::helpers::{handle_ffi_result_error, slice_from_ptr, str_from_ptr, track_error};

/// Table store under construction.
///
/// Filled table by table from the caller's reader, then handed to `resgrid_new`,
/// which takes ownership of it.
pub struct ResGridStore {
    pub(crate) store: MemoryStore,
}

/// Parameters of a synthetic box grid, see `resgrid_store_new_synthetic`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ResGridSyntheticGrid {
    pub ni: usize,
    pub nj: usize,
    pub nk: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    /// Last I column west of the fault; 0 for no fault.
    pub fault_column: usize,
    /// Downward offset of the columns east of the fault.
    pub fault_throw: f64,
    /// Permeability in every direction.
    pub permeability: f64,
}

fn write_store(out_store: *mut *mut ResGridStore, store: MemoryStore) {
    let boxed = Box::new(ResGridStore { store });
    // SAFETY: callers check `out_store` for null first
    unsafe {
        *out_store = Box::into_raw(boxed);
    }
}

/// Create an empty table store.
///
/// # Safety
/// - `out_store` must be a valid, non-null pointer to writable memory.
/// - The store must be passed to `resgrid_new` or freed with `resgrid_store_destroy`.
#[no_mangle]
pub unsafe extern "C" fn resgrid_store_new(out_store: *mut *mut ResGridStore) -> ResGridErrorCode {
    if out_store.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_store"));
    }
    write_store(out_store, MemoryStore::new());
    ResGridErrorCode::Ok
}

/// Create a store holding a synthetic corner-point grid, optionally faulted.
///
/// # Safety
/// - `out_store` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn resgrid_store_new_synthetic(
    grid: ResGridSyntheticGrid,
    out_store: *mut *mut ResGridStore,
) -> ResGridErrorCode {
    if out_store.is_null() {
        return track_error(&DefaultResGridError::null_pointer("out_store"));
    }
    if grid.ni == 0 || grid.nj == 0 || grid.nk == 0 {
        unsafe {
            *out_store = ptr::null_mut();
        }
        return track_error(&DefaultResGridError::invalid_parameter(format!(
            "Grid dimensions must be positive, got {}x{}x{}",
            grid.ni, grid.nj, grid.nk
        )));
    }

    let mut builder = GridStoreBuilder::new(grid.ni, grid.nj, grid.nk)
        .cell_size(grid.dx, grid.dy, grid.dz)
        .permeability(grid.permeability);
    if grid.fault_column > 0 {
        builder = builder.fault(grid.fault_column, grid.fault_throw);
    }
    write_store(out_store, builder.build());
    ResGridErrorCode::Ok
}

/// Store an integer table at `path`, replacing any previous table there.
///
/// # Safety
/// - `store` must come from `resgrid_store_new*` and not yet be consumed.
/// - `path` must be a NUL-terminated UTF-8 string.
/// - `data` must point to `len` readable values (may be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn resgrid_store_set_int_table(
    store: *mut ResGridStore,
    path: *const c_char,
    data: *const i64,
    len: usize,
) -> ResGridErrorCode {
    handle_ffi_result_error(|| {
        // SAFETY: see function contract
        let store = unsafe { store.as_mut() }.ok_or_else(|| DefaultResGridError::null_pointer("store"))?;
        let path = str_from_ptr(path, "path")?;
        let data = slice_from_ptr(data, len, "data")?;
        store.store.insert_ints(path, data.to_vec());
        Ok(())
    })
}

/// Store a floating-point table at `path`, replacing any previous table there.
///
/// # Safety
/// Same contract as `resgrid_store_set_int_table`.
#[no_mangle]
pub unsafe extern "C" fn resgrid_store_set_float_table(
    store: *mut ResGridStore,
    path: *const c_char,
    data: *const f64,
    len: usize,
) -> ResGridErrorCode {
    handle_ffi_result_error(|| {
        // SAFETY: see function contract
        let store = unsafe { store.as_mut() }.ok_or_else(|| DefaultResGridError::null_pointer("store"))?;
        let path = str_from_ptr(path, "path")?;
        let data = slice_from_ptr(data, len, "data")?;
        store.store.insert_floats(path, data.to_vec());
        Ok(())
    })
}

/// Free a store that was never passed to `resgrid_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `resgrid_store_new*` and not freed or consumed.
#[no_mangle]
pub unsafe extern "C" fn resgrid_store_destroy(store: *mut ResGridStore) {
    if store.is_null() {
        return;
    }
    // SAFETY: created by `Box::into_raw` in `write_store`
    unsafe {
        drop(Box::from_raw(store));
    }
}
