//! Scene assembly.
//!
//! A `Scene` collects triangles until it is handed to the BVH builder,
//! which takes ownership of the finalized list.

use lux_math::{Aabb, Vec3};

use crate::{Material, Triangle};

/// A growable list of triangles with their materials.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    triangles: Vec<Triangle>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single triangle.
    pub fn add_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3, material: Material) {
        self.triangles.push(Triangle::new(v1, v2, v3, material));
    }

    /// Add a planar quad `a b c d` as the two triangles `(a, b, c)` and `(a, c, d)`.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: Material) {
        self.add_triangle(a, b, c, material);
        self.add_triangle(a, c, d, material);
    }

    /// Append already-built triangles, e.g. from the OBJ loader.
    pub fn extend(&mut self, triangles: impl IntoIterator<Item = Triangle>) {
        self.triangles.extend(triangles);
    }

    /// Get the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Bounding box of every triangle, [`Aabb::EMPTY`] for an empty scene.
    pub fn bounds(&self) -> Aabb {
        self.triangles.iter().fold(Aabb::EMPTY, |mut acc, tri| {
            acc.merge(tri.aabb());
            acc
        })
    }

    /// Finalize the scene, yielding the triangle list.
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}
