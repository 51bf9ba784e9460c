//! Lux Renderer - CPU path tracing over a triangle BVH.
//!
//! - **Acceleration**: `Bvh`, a flat surface-area-heuristic hierarchy
//! - **Integration**: Monte Carlo path tracing with diffuse, emissive and
//!   glossy specular surfaces
//! - **Scheduling**: samples split across a fixed pool of worker threads,
//!   each with its own image and random stream
//! - **GPU layout**: `layout::GpuScene`, the same hierarchy flattened into
//!   `Pod` arrays ready for upload

mod backend;
mod bvh;
mod camera;
mod config;
mod error;
mod integrator;
pub mod layout;
mod sampling;
mod scheduler;

pub use backend::TraceBackend;
pub use bvh::{Bvh, BvhNode, Hit};
pub use camera::{Camera, RayGenerator};
pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use integrator::{trace, trace_with, TraceConfig, SHIFT_BIAS};
pub use sampling::{reflect, reflected_direction};
pub use scheduler::{distribute_samples, max_worker_threads, render, render_samples, render_with};

/// Re-export scene types from lux_core
pub use lux_core::{Color, Image, Material, MaterialKind, Scene, Triangle};
/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Ray, Vec3};
