//! sitescout-geo: Boundary loading, bounding-box geometry, and site attribute sampling.

pub mod error;
pub mod bounds;
pub mod distance;
pub mod boundary;
pub mod sampler;

pub use error::GeoError;
pub use bounds::{Bounds, MapView};
pub use boundary::{load_boundaries, load_boundary_file, BoundaryBatch, BoundaryFeature};
pub use sampler::{AttributeSampler, SampledAttributes};
