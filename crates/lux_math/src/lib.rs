// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;

/// Tolerance used by intersection routines to reject near-parallel
/// configurations and hits too close to the ray origin.
pub const EPSILON: f32 = 1e-6;
