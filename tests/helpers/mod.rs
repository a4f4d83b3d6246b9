//! Shared fixtures for session integration tests.

#![allow(dead_code)]

use ngtools::space::DescriptionCatalog;
use ngtools::types::{CoordinateSpace, SourceDescription};
use ngtools::{LoadRequest, MemoryStore, Session};

pub const BRAIN: &str = "zarr://host/brain.zarr";
pub const ATLAS: &str = "zarr://host/atlas.zarr";

pub fn xyz() -> CoordinateSpace {
    CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap()
}

/// Session whose provider knows the native axes of both fixtures.
pub fn session() -> Session<MemoryStore> {
    let mut catalog = DescriptionCatalog::new();
    for locator in [BRAIN, ATLAS] {
        catalog.insert(
            locator,
            SourceDescription {
                dimensions: Some(xyz()),
                ..Default::default()
            },
        );
    }
    Session::new(MemoryStore::default()).with_provider(Box::new(catalog))
}

/// Session with `brain` loaded.
pub fn with_brain() -> Session<MemoryStore> {
    let mut session = session();
    session.load(&LoadRequest::new(BRAIN).named("brain")).unwrap();
    session
}

pub fn output_names(session: &Session<MemoryStore>, layer: &str) -> Vec<String> {
    let state = session.state();
    let transform = state.layer(layer).unwrap().source[0]
        .transform
        .clone()
        .unwrap();
    transform.output_dimensions.names().map(String::from).collect()
}

pub fn matrix(session: &Session<MemoryStore>, layer: &str) -> Vec<Vec<f64>> {
    let state = session.state();
    state.layer(layer).unwrap().source[0]
        .transform
        .as_ref()
        .unwrap()
        .matrix_or_identity()
}

pub fn assert_close(actual: &[Vec<f64>], expected: &[Vec<f64>]) {
    assert_eq!(actual.len(), expected.len(), "row count");
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(a.len(), e.len(), "column count");
        for (x, y) in a.iter().zip(e) {
            assert!((x - y).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }
}
