//! Concrete grid geometries.

pub mod cubic;

pub use cubic::{CubicBounds, CubicGrid, CubicTransform};
