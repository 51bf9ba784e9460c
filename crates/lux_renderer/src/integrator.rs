//! Path integration.
//!
//! A path is walked iteratively, recording each bounce on a small stack,
//! then folded back from the last bounce to the first:
//!
//! ```text
//! L = emission + 2 * L_next * color * cos_theta
//! ```
//!
//! The factor 2 is the uniform-hemisphere estimator of a Lambertian
//! surface: pdf `1 / 2pi` against BRDF `color / pi`.

use lux_core::Color;
use lux_math::Ray;
use rand::RngCore;
use smallvec::SmallVec;

use crate::{reflected_direction, TraceBackend};

/// Distance a bounce origin is pushed along the surface normal.
pub const SHIFT_BIAS: f32 = 1e-4;

/// Integrator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    /// Maximum number of surface interactions per path
    pub max_depth: u32,
    /// Offset of each bounce origin along the normal
    pub shift_bias: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            shift_bias: SHIFT_BIAS,
        }
    }
}

/// One recorded surface interaction.
#[derive(Debug, Clone, Copy)]
struct Bounce {
    color: Color,
    emission: Color,
    cos_theta: f32,
}

/// Estimate the radiance arriving along `ray`, following at most
/// `max_depth` bounces.
pub fn trace<B: TraceBackend + ?Sized>(
    scene: &B,
    ray: Ray,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let config = TraceConfig {
        max_depth,
        ..Default::default()
    };
    trace_with(scene, ray, &config, rng)
}

/// [`trace`] with explicit integrator settings.
///
/// Paths that escape the scene or run out of depth contribute nothing past
/// their last bounce. Hitting an emitter ends the path with its emission.
pub fn trace_with<B: TraceBackend + ?Sized>(
    scene: &B,
    ray: Ray,
    config: &TraceConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut bounces: SmallVec<[Bounce; 8]> = SmallVec::new();
    let mut ray = ray;

    for _ in 0..config.max_depth {
        let Some(hit) = scene.nearest_hit(&ray) else {
            break;
        };
        let (normal, material) = scene.surface(hit.triangle, ray.direction);

        if material.is_emissive() {
            bounces.push(Bounce {
                color: material.color,
                emission: material.emission,
                cos_theta: 0.0,
            });
            break;
        }

        let point = ray.at(hit.t);
        let direction = reflected_direction(ray.direction, normal, &material, rng);
        bounces.push(Bounce {
            color: material.color,
            emission: material.emission,
            cos_theta: normal.dot(direction),
        });
        ray = Ray::new(point + normal * config.shift_bias, direction);
    }

    bounces.iter().rev().fold(Color::ZERO, |radiance, b| {
        b.emission + 2.0 * radiance * b.color * b.cos_theta
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bvh;
    use lux_core::{scenes, Material, Scene};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A floor at y = 0 under an emitter at y = `light_y`.
    fn floor_under_light(floor: Material, light: Color, light_y: f32) -> Bvh {
        let mut scene = Scene::new();
        let s = 1.0e4;
        scene.add_quad(
            Vec3::new(-s, 0.0, -s),
            Vec3::new(s, 0.0, -s),
            Vec3::new(s, 0.0, s),
            Vec3::new(-s, 0.0, s),
            floor,
        );
        let sky = scenes::quad_light(Vec3::new(0.0, light_y, 0.0), s, 1, light);
        scene.extend(sky.into_triangles());
        Bvh::build(scene.into_triangles()).unwrap()
    }

    #[test]
    fn test_miss_is_black() {
        let bvh = floor_under_light(Material::default(), Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        // Pointing down and away from both planes
        let ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), -Vec3::Y);
        assert_eq!(trace(&bvh, ray, 5, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let bvh = floor_under_light(Material::default(), Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), Vec3::Y);
        assert_eq!(trace(&bvh, ray, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_emitter_hit_returns_emission_exactly() {
        let emission = Color::new(0.7, 0.2, 3.0);
        let bvh = floor_under_light(Material::default(), emission, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), Vec3::Y);

        for depth in [1, 2, 10] {
            assert_eq!(trace(&bvh, ray, depth, &mut rng), emission);
        }
    }

    #[test]
    fn test_depth_one_off_a_reflector_is_black() {
        let bvh = floor_under_light(Material::default(), Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), -Vec3::Y);
        assert_eq!(trace(&bvh, ray, 1, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_mirror_sees_the_light() {
        let bvh = floor_under_light(Material::mirror(Color::splat(0.5)), Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), Vec3::new(1.0, -1.0, 0.0).normalize());

        // Straight reflection: 2 * 1 * 0.5 * cos(45deg)
        let expected = 2.0 * 0.5 * std::f32::consts::FRAC_1_SQRT_2;
        let c = trace(&bvh, ray, 2, &mut rng);
        assert!((c - Color::splat(expected)).abs().max_element() < 1e-4);
    }

    #[test]
    fn test_diffuse_floor_converges_to_albedo_times_emission() {
        // Every bounce off the floor reaches the light, so the estimator
        // averages 2 * albedo * cos_theta over the hemisphere: albedo.
        let bvh = floor_under_light(Material::diffuse(Color::splat(0.5)), Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(9);
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), -Vec3::Y);

        let n = 20_000;
        let mut sum = Color::ZERO;
        for _ in 0..n {
            sum += trace(&bvh, ray, 2, &mut rng);
        }
        let mean = sum / n as f32;
        assert!((mean - Color::splat(0.5)).abs().max_element() < 0.02, "mean {mean}");
    }
}
