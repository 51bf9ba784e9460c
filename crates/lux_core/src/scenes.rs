//! Built-in scenes.

use lux_math::Vec3;

use crate::{Color, Material, Scene};

/// Where a scene expects to be viewed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Horizontal field of view in degrees
    pub fov_degrees: f32,
}

/// The Cornell box (dimensions in millimetres, after the Cornell
/// measurements), with a white ceiling light, red left and green right wall,
/// and two white blocks.
pub fn cornell_box() -> (Scene, Viewpoint) {
    let white = Material::diffuse(Color::ONE);
    let red = Material::diffuse(Color::new(1.0, 0.0, 0.0));
    let green = Material::diffuse(Color::new(0.0, 1.0, 0.0));
    let light = Material::emit(Color::ONE);

    let v = Vec3::new;
    let mut scene = Scene::new();

    // floor
    scene.add_quad(
        v(552.8, 0.0, 0.0),
        v(0.0, 0.0, 0.0),
        v(0.0, 0.0, 559.2),
        v(549.6, 0.0, 559.2),
        white,
    );
    // light, just below the ceiling
    scene.add_quad(
        v(343.0, 548.7, 227.0),
        v(343.0, 548.7, 332.0),
        v(213.0, 548.7, 332.0),
        v(213.0, 548.7, 227.0),
        light,
    );
    // ceiling
    scene.add_quad(
        v(556.0, 548.8, 0.0),
        v(0.0, 548.8, 0.0),
        v(0.0, 548.8, 559.2),
        v(556.0, 548.8, 559.2),
        white,
    );
    // back wall
    scene.add_quad(
        v(549.6, 0.0, 559.2),
        v(0.0, 0.0, 559.2),
        v(0.0, 548.8, 559.2),
        v(556.0, 548.8, 559.2),
        white,
    );
    // right wall
    scene.add_quad(
        v(0.0, 0.0, 559.2),
        v(0.0, 0.0, 0.0),
        v(0.0, 548.8, 0.0),
        v(0.0, 548.8, 559.2),
        green,
    );
    // left wall
    scene.add_quad(
        v(552.8, 0.0, 0.0),
        v(549.6, 0.0, 559.2),
        v(556.0, 548.8, 559.2),
        v(556.0, 548.8, 0.0),
        red,
    );

    // short block
    let short = [
        [
            v(130.0, 165.0, 65.0),
            v(82.0, 165.0, 225.0),
            v(240.0, 165.0, 272.0),
            v(290.0, 165.0, 114.0),
        ],
        [
            v(290.0, 0.0, 114.0),
            v(290.0, 165.0, 114.0),
            v(240.0, 165.0, 272.0),
            v(240.0, 0.0, 272.0),
        ],
        [v(130.0, 0.0, 65.0), v(130.0, 165.0, 65.0), v(290.0, 165.0, 114.0), v(290.0, 0.0, 114.0)],
        [v(82.0, 0.0, 225.0), v(82.0, 165.0, 225.0), v(130.0, 165.0, 65.0), v(130.0, 0.0, 65.0)],
        [v(240.0, 0.0, 272.0), v(240.0, 165.0, 272.0), v(82.0, 165.0, 225.0), v(82.0, 0.0, 225.0)],
    ];
    // tall block
    let tall = [
        [
            v(423.0, 330.0, 247.0),
            v(265.0, 330.0, 296.0),
            v(314.0, 330.0, 456.0),
            v(472.0, 330.0, 406.0),
        ],
        [
            v(423.0, 0.0, 247.0),
            v(423.0, 330.0, 247.0),
            v(472.0, 330.0, 406.0),
            v(472.0, 0.0, 406.0),
        ],
        [
            v(472.0, 0.0, 406.0),
            v(472.0, 330.0, 406.0),
            v(314.0, 330.0, 456.0),
            v(314.0, 0.0, 456.0),
        ],
        [
            v(314.0, 0.0, 456.0),
            v(314.0, 330.0, 456.0),
            v(265.0, 330.0, 296.0),
            v(265.0, 0.0, 296.0),
        ],
        [
            v(265.0, 0.0, 296.0),
            v(265.0, 330.0, 296.0),
            v(423.0, 330.0, 247.0),
            v(423.0, 0.0, 247.0),
        ],
    ];
    for [a, b, c, d] in short.into_iter().chain(tall) {
        scene.add_quad(a, b, c, d, white);
    }

    let view = Viewpoint {
        look_from: v(278.0, 278.0, -500.0),
        look_at: v(278.0, 278.0, 0.0),
        up: Vec3::Y,
        fov_degrees: 60.0,
    };
    (scene, view)
}

/// An axis-aligned square emitter of half-size `half` centred at `center`,
/// lying in the plane perpendicular to `axis` (0 = X, 1 = Y, 2 = Z).
pub fn quad_light(center: Vec3, half: f32, axis: usize, emission: Color) -> Scene {
    let (du, dv) = match axis {
        0 => (Vec3::Y, Vec3::Z),
        1 => (Vec3::Z, Vec3::X),
        _ => (Vec3::X, Vec3::Y),
    };
    let (du, dv) = (du * half, dv * half);

    let mut scene = Scene::new();
    scene.add_quad(
        center - du - dv,
        center + du - dv,
        center + du + dv,
        center - du + dv,
        Material::emit(emission),
    );
    scene
}
