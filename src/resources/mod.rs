//! Geometry resources

mod mesh;

pub use mesh::*;
