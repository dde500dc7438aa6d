mod common;

use approx::assert_relative_eq;
use resgrid_core::{
    store::paths, Connection, ConnectionKind, Element, Face, GridStoreBuilder, IndexDomain,
    TableStore,
};

/// 2x1x1 matrix block with a fracture behind every cell, 10 x 20 x 5 cells
fn dual() -> GridStoreBuilder {
    GridStoreBuilder::new(2, 1, 1)
        .cell_size(10.0, 20.0, 5.0)
        .permeability(100.0)
        .fractures(true)
}

#[test]
fn test_sizes_and_numbering() {
    let engine = common::engine(dual().inactive(&[4]).build());
    let index = engine.index();
    let sizes = index.sizes();
    assert!(index.has_fracture());
    assert_eq!(sizes.n_cells, 4);
    assert_eq!(sizes.n_matrix, 2);
    assert_eq!(sizes.n_fracture, 2);
    assert_eq!(sizes.n_active, 3);
    assert_eq!(sizes.n_active_matrix, 2);
    assert_eq!(sizes.n_active_fracture, 1);

    let coord = index.linear_to_structured(3).unwrap();
    assert_eq!((coord.i, coord.j, coord.k), (1, 1, 1));
    assert_eq!(coord.element, Element::Fracture);
    assert_eq!(index.complete_to_active(4).unwrap(), None);
}

#[test]
fn test_fracture_cells_share_matrix_geometry() {
    let engine = common::engine(dual().build());
    for cell in 1..=2 {
        assert_eq!(
            engine.cell_nodes(cell, None).unwrap(),
            engine.cell_nodes(cell + 2, None).unwrap()
        );
    }
}

#[test]
fn test_matrix_fracture_transmissibility() {
    let mut engine = common::engine(dual().build());
    let connections = engine.connections().unwrap().to_vec();
    assert_eq!(
        connections,
        vec![
            Connection::new(1, 2, ConnectionKind::I),
            Connection::new(3, 4, ConnectionKind::I),
            Connection::new(1, 3, ConnectionKind::MatrixFracture),
            Connection::new(2, 4, ConnectionKind::MatrixFracture),
        ]
    );

    let geometry = engine.connection_geometry(&connections[2]).unwrap();
    assert!(geometry.shared.is_coincident());
    assert_eq!(
        geometry.face_i.to_vec(),
        engine.cell_nodes(1, Some(Face::KPlus)).unwrap()
    );

    // I: 1000 in both elements. MF: A = 10·20, D = 2.5 to each cell's own
    // K face → T_x = 100·200·2.5/6.25 = 8000, T = 4000
    let expected = [1000.0, 1000.0, 4000.0, 4000.0];
    for (t, e) in engine.transmissibilities(false).unwrap().iter().zip(expected) {
        assert_relative_eq!(*t, e, max_relative = 1e-6);
    }
}

#[test]
fn test_fracture_first_records_put_matrix_first() {
    let mut store = dual().build();
    store.insert_ints(paths::CONNECTION_CELL_1, vec![3, 4]);
    store.insert_ints(paths::CONNECTION_CELL_2, vec![1, 2]);
    store.insert_ints(paths::CONNECTION_DIRECTION, vec![4, 4]);
    let mut engine = common::engine(store);

    let connections = engine.connections().unwrap().to_vec();
    assert_eq!(
        connections,
        vec![
            Connection::new(1, 3, ConnectionKind::MatrixFracture),
            Connection::new(2, 4, ConnectionKind::MatrixFracture),
        ]
    );
    for c in &connections {
        let coord = engine.index().linear_to_structured(c.cell_i).unwrap();
        assert_eq!(coord.element, Element::Matrix);
    }

    let geometry = engine.connection_geometry(&connections[0]).unwrap();
    assert_eq!(
        geometry.face_i.to_vec(),
        engine.cell_nodes(1, Some(Face::KPlus)).unwrap()
    );
    for t in engine.transmissibilities(false).unwrap() {
        assert_relative_eq!(*t, 4000.0, max_relative = 1e-6);
    }
}

#[test]
fn test_matrix_fracture_uses_vertical_permeability() {
    let store = dual().permeabilities(100.0, 100.0, 10.0).net_to_gross(0.5).build();
    let mut engine = common::engine(store);
    let trans = engine.transmissibilities(false).unwrap().to_vec();
    assert_relative_eq!(trans[0], 500.0, max_relative = 1e-6);
    assert_relative_eq!(trans[2], 400.0, max_relative = 1e-6);
}

#[test]
fn test_properties_resolve_per_element() {
    let engine = common::engine(dual().inactive(&[2]).net_to_gross(0.5).build());
    let store = engine.store();
    let complete = store
        .property("NET/GROSS", engine.index(), IndexDomain::Complete)
        .unwrap();
    assert_eq!(complete, vec![0.5, 0.0, 0.5, 0.5]);
    let active = store
        .property("PERMK", engine.index(), IndexDomain::Active)
        .unwrap();
    assert_eq!(active.len(), 3);
}
