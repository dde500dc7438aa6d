//! Shared setup for the integration tests

use resgrid_core::{ConnectionEngine, EngineConfig, MemoryStore};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Engine with default tolerances over `store`
#[allow(dead_code)]
pub fn engine(store: MemoryStore) -> ConnectionEngine<MemoryStore> {
    ConnectionEngine::new(store, EngineConfig::default()).expect("valid synthetic grid")
}
