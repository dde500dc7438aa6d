mod common;

use approx::assert_relative_eq;
use resgrid_core::store::paths;
use resgrid_core::{
    Connection, ConnectionEngine, ConnectionKind, EngineConfig, GridStoreBuilder, MemoryStore,
};

/// 2x2x1 grid of 10 x 20 x 5 cells, K = 100 everywhere
fn two_by_two() -> GridStoreBuilder {
    GridStoreBuilder::new(2, 2, 1)
        .cell_size(10.0, 20.0, 5.0)
        .permeability(100.0)
}

#[test]
fn test_two_by_two_hand_values() {
    let mut engine = common::engine(two_by_two().build());

    let connections = engine.connections().unwrap().to_vec();
    assert_eq!(
        connections,
        vec![
            Connection::new(1, 2, ConnectionKind::I),
            Connection::new(1, 3, ConnectionKind::J),
            Connection::new(2, 4, ConnectionKind::J),
            Connection::new(3, 4, ConnectionKind::I),
        ]
    );

    // I: A = 20·5, D = 5   → T_x = 100·100·5/25 = 2000, T = 1000
    // J: A = 10·5, D = 10  → T_x = 100·50·10/100 = 500, T = 250
    let expected = [1000.0, 250.0, 250.0, 1000.0];
    let trans = engine.transmissibilities(false).unwrap();
    assert_eq!(trans.len(), expected.len());
    for (t, e) in trans.iter().zip(expected) {
        assert_relative_eq!(*t, e, max_relative = 1e-6);
    }
}

#[test]
fn test_explicit_and_regular_geometry_agree() {
    let mut regular = common::engine(two_by_two().build());
    let mut explicit = common::engine(two_by_two().explicit_geometry(true).build());
    let a = regular.transmissibilities(false).unwrap().to_vec();
    let b = explicit.transmissibilities(false).unwrap().to_vec();
    for (x, y) in a.iter().zip(&b) {
        assert_relative_eq!(*x, *y, max_relative = 1e-12);
    }
}

#[test]
fn test_net_to_gross_thins_lateral_flow_only() {
    let mut engine = common::engine(two_by_two().net_to_gross(0.5).build());
    let expected = [500.0, 125.0, 125.0, 500.0];
    for (t, e) in engine.transmissibilities(false).unwrap().iter().zip(expected) {
        assert_relative_eq!(*t, e, max_relative = 1e-6);
    }

    // Vertical pair: A = 10·20, D = 2.5 → T_x = 100·200·2.5/6.25 = 8000
    let store = GridStoreBuilder::new(1, 1, 2)
        .cell_size(10.0, 20.0, 5.0)
        .net_to_gross(0.5)
        .build();
    let mut engine = common::engine(store);
    let trans = engine.transmissibilities(false).unwrap();
    assert_eq!(trans.len(), 1);
    assert_relative_eq!(trans[0], 4000.0, max_relative = 1e-6);
}

#[test]
fn test_symmetric_under_cell_swap() {
    // Swap the permeabilities of the two cells: same T
    let perms = |k1: f64, k2: f64| {
        let mut store = GridStoreBuilder::new(2, 1, 1).cell_size(10.0, 20.0, 5.0).build();
        store.insert_property(paths::PERM_I, vec![k1, k2]);
        let mut engine = common::engine(store);
        let t = engine.transmissibilities(false).unwrap()[0];
        t
    };
    let forward = perms(50.0, 200.0);
    let backward = perms(200.0, 50.0);
    assert_relative_eq!(forward, backward, max_relative = 1e-12);
    // 50·20 and 200·20 in series
    assert_relative_eq!(forward, 800.0, max_relative = 1e-9);

    // Raw records written in either order canonicalize to the same connection
    let mut store = GridStoreBuilder::new(2, 1, 1).cell_size(10.0, 20.0, 5.0).build();
    store.insert_ints(paths::CONNECTION_CELL_1, vec![2]);
    store.insert_ints(paths::CONNECTION_CELL_2, vec![1]);
    let mut engine = common::engine(store);
    assert_eq!(
        engine.connections().unwrap(),
        &[Connection::new(1, 2, ConnectionKind::I)]
    );
    assert_relative_eq!(engine.transmissibilities(false).unwrap()[0], 1000.0, max_relative = 1e-9);
}

#[test]
fn test_zero_permeability_blocks_flow() {
    let mut store = two_by_two().build();
    store.insert_property(paths::PERM_I, vec![0.0, 100.0, 100.0, 100.0]);
    let mut engine = common::engine(store);
    let trans = engine.transmissibilities(false).unwrap();
    assert_eq!(trans[0], 0.0);
    assert_relative_eq!(trans[3], 1000.0, max_relative = 1e-6);

    let mut store = two_by_two().build();
    store.insert_property(paths::PERM_I, vec![1e-9, 100.0, 100.0, 100.0]);
    let mut engine = common::engine(store);
    let t = engine.transmissibilities(false).unwrap()[0];
    assert!(t > 0.0 && t < 1e-6);
}

#[test]
fn test_precise_area_on_flat_faces() {
    let config = EngineConfig {
        precise_area: true,
        ..EngineConfig::default()
    };
    let mut engine = ConnectionEngine::new(two_by_two().build(), config).unwrap();
    let expected = [1000.0, 250.0, 250.0, 1000.0];
    for (t, e) in engine.transmissibilities(false).unwrap().iter().zip(expected) {
        assert_relative_eq!(*t, e, max_relative = 1e-6);
    }
}

#[test]
fn test_inactive_cells_keep_complete_numbering() {
    // Cell 2 inactive: only the J connection 1-3 and I connection 3-4 remain
    let mut engine = common::engine(two_by_two().inactive(&[2]).net_to_gross(0.5).build());
    assert_eq!(
        engine.connections().unwrap(),
        &[
            Connection::new(1, 3, ConnectionKind::J),
            Connection::new(3, 4, ConnectionKind::I),
        ]
    );
    let trans = engine.transmissibilities(false).unwrap();
    assert_relative_eq!(trans[0], 125.0, max_relative = 1e-6);
    assert_relative_eq!(trans[1], 500.0, max_relative = 1e-6);
}

#[test]
fn test_json_store_round_trip() {
    let store = two_by_two().build();
    let json = serde_json::to_string(&store).unwrap();
    let loaded: MemoryStore = serde_json::from_str(&json).unwrap();
    let mut engine = common::engine(loaded);
    let records = engine.connections().unwrap().to_vec();
    let lines = engine.sconnect_records(&records, None).unwrap();
    assert_eq!(lines[0], " 1 1 1   2 1 1   1000");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_missing_permeability() {
    let mut store = two_by_two().build();
    store.remove(&paths::property(paths::PERM_J));
    let mut engine = common::engine(store);
    assert!(engine.connections().is_ok());
    assert!(matches!(
        engine.transmissibilities(false),
        Err(resgrid_core::GridError::MissingProperty(_))
    ));
}
