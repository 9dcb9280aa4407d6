//! Visibility culling

mod frustum;

pub use frustum::*;
