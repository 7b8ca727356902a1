//! Repository layer: entity-scoped database operations.

mod prescription;

pub use prescription::*;
