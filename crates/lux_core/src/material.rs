//! Surface materials.
//!
//! A material is a plain value: a kind tag plus the parameters any kind may
//! read. Behavior is selected by matching on [`MaterialKind`], which keeps
//! materials `Copy` and trivially flattenable for upload to a shader.

use lux_math::Vec3;

/// Color type alias (linear RGB, typically 0-1 for reflectance)
pub type Color = Vec3;

/// Which scattering behavior a [`Material`] has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Lambertian diffuse reflector.
    Diffuse,
    /// Light source; paths terminate on hit.
    Emit,
    /// Mirror-like reflector, blurred by `roughness`.
    Specular,
}

impl MaterialKind {
    /// Stable numeric tag used by the flattened GPU layout.
    pub fn as_u32(self) -> u32 {
        match self {
            MaterialKind::Emit => 1,
            MaterialKind::Diffuse => 2,
            MaterialKind::Specular => 3,
        }
    }

    /// Inverse of [`MaterialKind::as_u32`].
    pub fn from_u32(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(MaterialKind::Emit),
            2 => Some(MaterialKind::Diffuse),
            3 => Some(MaterialKind::Specular),
            _ => None,
        }
    }
}

/// A surface material.
///
/// Only `kind` selects behavior; fields a kind does not use are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Surface reflectance
    pub color: Color,
    /// Emitted radiance (non-zero for lights only)
    pub emission: Color,
    /// Reflection blur for specular surfaces, 0 = perfect mirror
    pub roughness: f32,
}

impl Material {
    /// Lambertian diffuse material with the given albedo.
    pub fn diffuse(color: Color) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            color,
            emission: Color::ZERO,
            roughness: 0.0,
        }
    }

    /// Light source emitting `color`.
    ///
    /// The surface color is set to the emitted color as well.
    pub fn emit(color: Color) -> Self {
        Self {
            kind: MaterialKind::Emit,
            color,
            emission: color,
            roughness: 0.0,
        }
    }

    /// Glossy reflector. Negative roughness is clamped to zero.
    pub fn specular(color: Color, roughness: f32) -> Self {
        Self {
            kind: MaterialKind::Specular,
            color,
            emission: Color::ZERO,
            roughness: roughness.max(0.0),
        }
    }

    /// Perfect mirror (specular with zero roughness).
    pub fn mirror(color: Color) -> Self {
        Self::specular(color, 0.0)
    }

    /// True for light sources.
    #[inline]
    pub fn is_emissive(&self) -> bool {
        self.kind == MaterialKind::Emit
    }
}

impl Default for Material {
    /// Grey diffuse, used wherever a material reference cannot be resolved.
    fn default() -> Self {
        Self::diffuse(Color::splat(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_zero_unused_fields() {
        let d = Material::diffuse(Color::new(1.0, 0.0, 0.0));
        assert_eq!(d.kind, MaterialKind::Diffuse);
        assert_eq!(d.emission, Color::ZERO);
        assert_eq!(d.roughness, 0.0);

        let e = Material::emit(Color::ONE);
        assert!(e.is_emissive());
        assert_eq!(e.emission, Color::ONE);

        let s = Material::specular(Color::ONE, 0.3);
        assert_eq!(s.kind, MaterialKind::Specular);
        assert_eq!(s.roughness, 0.3);
        assert_eq!(s.emission, Color::ZERO);
    }

    #[test]
    fn test_mirror_is_smooth_specular() {
        assert_eq!(Material::mirror(Color::ONE), Material::specular(Color::ONE, 0.0));
        assert_eq!(Material::specular(Color::ONE, -1.0).roughness, 0.0);
    }

    #[test]
    fn test_kind_tags() {
        for kind in [MaterialKind::Diffuse, MaterialKind::Emit, MaterialKind::Specular] {
            assert_eq!(MaterialKind::from_u32(kind.as_u32()), Some(kind));
        }
        assert_eq!(MaterialKind::from_u32(0), None);
    }

    #[test]
    fn test_value_equality() {
        let a = Material::diffuse(Color::splat(0.25));
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, Material::diffuse(Color::splat(0.5)));
    }

    #[test]
    fn test_default_is_grey_diffuse() {
        let m = Material::default();
        assert_eq!(m.kind, MaterialKind::Diffuse);
        assert_eq!(m.color, Color::splat(0.5));
    }
}
