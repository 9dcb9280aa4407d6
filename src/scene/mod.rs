//! Scene primitives: camera, transform, bounds

mod bounds;
mod camera;
mod transform;

pub use bounds::*;
pub use camera::*;
pub use transform::*;
