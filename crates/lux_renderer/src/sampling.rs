//! Direction sampling for each material kind.

use std::f32::consts::{FRAC_PI_2, TAU};

use lux_core::{Material, MaterialKind};
use lux_math::Vec3;
use rand::{Rng, RngCore};

/// Choose the outgoing direction at a surface.
///
/// `normal` must face against `incoming`. Diffuse and specular results lie
/// in the normal's hemisphere and are unit length. Emitters return
/// `incoming` unchanged; the integrator never continues a path from them.
pub fn reflected_direction(
    incoming: Vec3,
    normal: Vec3,
    material: &Material,
    rng: &mut dyn RngCore,
) -> Vec3 {
    match material.kind {
        MaterialKind::Emit => incoming,
        MaterialKind::Diffuse => sample_hemisphere(normal, rng),
        MaterialKind::Specular => sample_glossy(incoming, normal, material.roughness, rng),
    }
}

/// Mirror `v` about the plane with unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Uniform direction on the hemisphere around `normal`.
///
/// A uniform point on the sphere (uniform height, uniform azimuth) is
/// mirrored into the normal's side when it lands below the surface.
fn sample_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let theta = (2.0 * rng.gen::<f32>() - 1.0).acos() - FRAC_PI_2;
    let phi = TAU * rng.gen::<f32>();

    let dir = Vec3::new(
        theta.cos() * phi.cos(),
        theta.cos() * phi.sin(),
        theta.sin(),
    );
    if dir.dot(normal) < 0.0 {
        -dir
    } else {
        dir
    }
}

/// Mirror reflection blurred by a uniform cube of half-width
/// `roughness / 2`, resampled until it leaves the surface.
fn sample_glossy(incoming: Vec3, normal: Vec3, roughness: f32, rng: &mut dyn RngCore) -> Vec3 {
    let mirrored = reflect(incoming, normal).normalize();
    if roughness <= 0.0 {
        return mirrored;
    }

    loop {
        let jitter = (Vec3::new(rng.gen(), rng.gen(), rng.gen()) - 0.5) * roughness;
        let dir = (mirrored + jitter).normalize_or_zero();
        if dir.dot(normal) > 0.0 {
            return dir;
        }
    }
}
