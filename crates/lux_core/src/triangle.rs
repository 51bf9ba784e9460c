//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::Material;
use lux_math::{Aabb, Ray, Vec3, EPSILON};

/// A triangle primitive.
///
/// Centroid, bounds and face normal are computed once at construction;
/// a triangle is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Vertices
    v1: Vec3,
    v2: Vec3,
    v3: Vec3,
    /// Mean of the three vertices
    centroid: Vec3,
    /// Tight bounding box over the vertices
    aabb: Aabb,
    /// Unit face normal, (v2 - v1) x (v3 - v1)
    normal: Vec3,
    material: Material,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3, material: Material) -> Self {
        let normal = face_normal(v1, v2, v3);

        Self {
            v1,
            v2,
            v3,
            centroid: (v1 + v2 + v3) / 3.0,
            aabb: Aabb::from_points(&[v1, v2, v3]),
            normal,
            material,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v1, self.v2, self.v3]
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the hit distance `t`, which is always greater than
    /// [`EPSILON`] so a ray leaving a surface does not hit it again at its
    /// own origin.
    #[inline]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        intersect_triangle(self.v1, self.v2, self.v3, ray)
    }

    /// Unit face normal, flipped to face against `ray_dir`.
    #[inline]
    pub fn normal(&self, ray_dir: Vec3) -> Vec3 {
        if self.normal.dot(ray_dir) < 0.0 {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Unit normal of the triangle `v1 v2 v3`, `(v2 - v1) x (v3 - v1)`.
/// Zero for a degenerate triangle.
pub fn face_normal(v1: Vec3, v2: Vec3, v3: Vec3) -> Vec3 {
    (v2 - v1).cross(v3 - v1).normalize_or_zero()
}

/// Möller-Trumbore intersection of `ray` with the triangle `v1 v2 v3`.
///
/// Shared by [`Triangle`] and flattened triangle layouts so every data
/// layout agrees on what counts as a hit.
pub fn intersect_triangle(v1: Vec3, v2: Vec3, v3: Vec3, ray: &Ray) -> Option<f32> {
    let edge1 = v2 - v1;
    let edge2 = v3 - v1;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v1;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Material::diffuse(Vec3::splat(0.5)),
        )
    }

    #[test]
    fn test_triangle_derived_fields() {
        let tri = xy_triangle();
        assert!((tri.centroid() - Vec3::new(0.0, -1.0 / 3.0, -1.0)).length() < 1e-6);
        assert_eq!(tri.aabb().lb, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(tri.aabb().rt, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let t = tri.intersect(&ray).expect("ray should hit the triangle");
        assert!((t - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle();

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&ray).is_none());

        // Ray passing beside the triangle
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_rejects_hit_at_origin() {
        let tri = xy_triangle();
        // Origin lies on the surface
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_normal_faces_incoming_ray() {
        let tri = xy_triangle();
        let from_front = tri.normal(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(from_front, Vec3::Z);

        let from_back = tri.normal(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(from_back, -Vec3::Z);
    }
}
