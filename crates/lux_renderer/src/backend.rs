//! The scene queries the integrator is written against.
//!
//! [`Bvh`](crate::Bvh) answers them from its object-oriented node list;
//! [`GpuScene`](crate::layout::GpuScene) answers them from the flattened
//! arrays a shader reads. Tracing through either must give the same result,
//! which keeps the upload layout honest.

use lux_core::Material;
use lux_math::{Ray, Vec3};

use crate::Hit;

/// Ray queries needed to trace a path.
pub trait TraceBackend: Sync {
    /// Nearest triangle hit along `ray`, if any.
    fn nearest_hit(&self, ray: &Ray) -> Option<Hit>;

    /// Unit normal facing against `ray_dir`, and material, of a hit triangle.
    fn surface(&self, triangle: usize, ray_dir: Vec3) -> (Vec3, Material);
}
