//! Lux Core - Scene data for the Lux path tracer.
//!
//! This crate provides:
//!
//! - **Primitives**: `Triangle` with precomputed centroid and bounds
//! - **Materials**: the closed `Material` variant (diffuse, emit, specular)
//! - **Framebuffers**: `Image` in linear radiance with PNG/PPM output
//! - **Loading**: Wavefront OBJ import and built-in test scenes
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use lux_core::{obj::load_obj, Material, Vec3};
//!
//! let mut materials = HashMap::new();
//! materials.insert("light".to_string(), Material::emit(Vec3::ONE));
//! let triangles = load_obj("scene.obj", &materials)?;
//! println!("Loaded {} triangles", triangles.len());
//! ```

pub mod framebuffer;
pub mod material;
pub mod obj;
pub mod scene;
pub mod scenes;
pub mod triangle;

// Re-export commonly used types
pub use framebuffer::{Image, ImageError, ImageResult};
pub use material::{Color, Material, MaterialKind};
pub use obj::{load_obj, ObjError, ObjResult};
pub use scene::Scene;
pub use triangle::{face_normal, intersect_triangle, Triangle};

/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Ray, Vec3};
