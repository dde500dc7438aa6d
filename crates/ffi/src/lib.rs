//! C ABI for the reservoir grid connection engine
//!
//! Build a table store (`resgrid_store_*`), hand it to `resgrid_new`, then
//! query connections, transmissibilities and geometry. Every function returns
//! a `ResGridErrorCode`; details of the last failure on the calling thread
//! are available from `resgrid_get_last_error`.

pub mod error;
mod helpers;
pub mod instance;
pub mod queries;
pub mod store;

pub use error::{resgrid_get_last_error, resgrid_get_last_error_code, ResGridErrorCode};
pub use instance::{
    resgrid_default_config, resgrid_destroy, resgrid_new, ResGridConfig, ResGridInstance,
};
pub use queries::{
    resgrid_cell_center, resgrid_clear_snapshots, resgrid_get_connections, resgrid_get_sizes,
    resgrid_get_transmissibilities, resgrid_invalidate, resgrid_set_config, ResGridConnection,
    ResGridPoint, ResGridSizes,
};
pub use store::{
    resgrid_store_destroy, resgrid_store_new, resgrid_store_new_synthetic,
    resgrid_store_set_float_table, resgrid_store_set_int_table, ResGridStore, ResGridSyntheticGrid,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::ptr;

    fn synthetic(fault_column: usize, fault_throw: f64) -> *mut ResGridStore {
        let grid = ResGridSyntheticGrid {
            ni: 2,
            nj: 2,
            nk: 1,
            dx: 10.0,
            dy: 20.0,
            dz: 5.0,
            fault_column,
            fault_throw,
            permeability: 100.0,
        };
        let mut store = ptr::null_mut();
        assert_eq!(unsafe { resgrid_store_new_synthetic(grid, &mut store) }, ResGridErrorCode::Ok);
        store
    }

    fn instance(store: *mut ResGridStore) -> *mut ResGridInstance {
        let mut instance = ptr::null_mut();
        let code = unsafe { resgrid_new(store, ptr::null(), &mut instance) };
        assert_eq!(code, ResGridErrorCode::Ok);
        instance
    }

    #[test]
    fn test_connections_and_transmissibilities() {
        let grid = instance(synthetic(0, 0.0));

        let mut len = 0;
        let mut conns = ptr::null();
        assert_eq!(
            unsafe { resgrid_get_connections(grid, &mut len, &mut conns) },
            ResGridErrorCode::Ok
        );
        let conns = unsafe { std::slice::from_raw_parts(conns, len) };
        assert_eq!(
            conns[1],
            ResGridConnection {
                cell_i: 1,
                cell_j: 3,
                direction: 2
            }
        );

        let mut trans = ptr::null();
        assert_eq!(
            unsafe { resgrid_get_transmissibilities(grid, false, &mut len, &mut trans) },
            ResGridErrorCode::Ok
        );
        let trans = unsafe { std::slice::from_raw_parts(trans, len) };
        assert_eq!(trans.len(), 4);
        assert!((trans[0] - 1000.0).abs() < 1e-6);
        assert!((trans[1] - 250.0).abs() < 1e-6);

        let mut sizes = std::mem::MaybeUninit::<ResGridSizes>::uninit();
        assert_eq!(
            unsafe { resgrid_get_sizes(grid, sizes.as_mut_ptr()) },
            ResGridErrorCode::Ok
        );
        let sizes = unsafe { sizes.assume_init() };
        assert_eq!((sizes.ni, sizes.nj, sizes.nk, sizes.n_active), (2, 2, 1, 4));

        unsafe { resgrid_destroy(grid) };
    }

    #[test]
    fn test_store_tables_from_caller() {
        let mut store = ptr::null_mut();
        assert_eq!(unsafe { resgrid_store_new(&mut store) }, ResGridErrorCode::Ok);
        let path = CString::new("SpatialProperties/000000/GRID/IGNTID").unwrap();
        let data = [3i64];
        assert_eq!(
            unsafe { resgrid_store_set_int_table(store, path.as_ptr(), data.as_ptr(), 1) },
            ResGridErrorCode::Ok
        );

        // Missing the other grid tables
        let mut grid = ptr::null_mut();
        let code = unsafe { resgrid_new(store, ptr::null(), &mut grid) };
        assert_eq!(code, ResGridErrorCode::MissingTable);
        assert!(grid.is_null());
        assert_eq!(resgrid_get_last_error_code(), ResGridErrorCode::MissingTable);
        let msg = unsafe { CStr::from_ptr(resgrid_get_last_error()) };
        assert!(msg.to_str().unwrap().contains("IGNTJD"));
    }

    #[test]
    fn test_successful_construction_clears_last_error() {
        let mut grid = ptr::null_mut();
        assert_eq!(
            unsafe { resgrid_new(ptr::null_mut(), ptr::null(), &mut grid) },
            ResGridErrorCode::NullPointer
        );
        assert_eq!(resgrid_get_last_error_code(), ResGridErrorCode::NullPointer);

        let grid = instance(synthetic(0, 0.0));
        assert_eq!(resgrid_get_last_error_code(), ResGridErrorCode::Ok);
        assert!(resgrid_get_last_error().is_null());
        unsafe { resgrid_destroy(grid) };
    }

    #[test]
    fn test_cell_center_and_faces() {
        let grid = instance(synthetic(1, 2.0));
        let mut point = ResGridPoint::default();
        assert_eq!(
            unsafe { resgrid_cell_center(grid, 2, -1, &mut point) },
            ResGridErrorCode::Ok
        );
        assert_eq!(point, ResGridPoint { x: 15.0, y: 10.0, z: 4.5 });

        assert_eq!(
            unsafe { resgrid_cell_center(grid, 2, 4, &mut point) },
            ResGridErrorCode::Ok
        );
        assert_eq!(point.z, 2.0);

        assert_eq!(
            unsafe { resgrid_cell_center(grid, 2, 6, &mut point) },
            ResGridErrorCode::InvalidFace
        );
        assert_eq!(
            unsafe { resgrid_cell_center(grid, 9, -1, &mut point) },
            ResGridErrorCode::OutOfRange
        );
        unsafe { resgrid_destroy(grid) };
    }

    #[test]
    fn test_config_and_null_handling() {
        let grid = instance(synthetic(0, 0.0));
        let mut config = resgrid_default_config();
        assert_eq!(config.z_scale, 100.0);
        config.epsilon = -1.0;
        assert_eq!(resgrid_set_config(grid, config), ResGridErrorCode::InvalidConfig);
        assert_eq!(resgrid_invalidate(grid), ResGridErrorCode::Ok);
        assert_eq!(resgrid_clear_snapshots(grid), ResGridErrorCode::Ok);
        assert_eq!(resgrid_invalidate(ptr::null()), ResGridErrorCode::NullPointer);

        let mut len = 7;
        assert_eq!(
            unsafe { resgrid_get_connections(grid, &mut len, ptr::null_mut()) },
            ResGridErrorCode::NullPointer
        );
        assert_eq!(len, 0);
        unsafe { resgrid_destroy(grid) };
    }
}
