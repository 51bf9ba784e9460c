//! End-to-end rendering scenarios with known answers.

use lux_core::{scenes, Color, Image, Material, Scene};
use lux_math::{Ray, Vec3};
use lux_renderer::{
    distribute_samples, max_worker_threads, render, render_samples, render_with, Bvh, Camera,
    RenderConfig, RenderError, TraceConfig,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

const EMISSION: f32 = 2.0;

/// A large square emitter facing +Z at z = -3.
fn light_wall() -> Bvh {
    let scene = scenes::quad_light(Vec3::new(0.0, 0.0, -3.0), 1.0e3, 2, Color::splat(EMISSION));
    Bvh::build(scene.into_triangles()).unwrap()
}

/// Parallel rays straight into the light wall, one per pixel.
fn straight_ahead(x: u32, y: u32, _rng: &mut dyn RngCore) -> Ray {
    Ray::new(Vec3::new(x as f32 * 0.1 + 0.03, y as f32 * 0.1 + 0.07, 0.0), -Vec3::Z)
}

/// A grey diffuse floor at y = 0 under an emitter covering the sky at y = 1.
fn floor_under_sky(albedo: f32) -> Bvh {
    let s = 1.0e4;
    let mut scene = Scene::new();
    scene.add_quad(
        Vec3::new(-s, 0.0, -s),
        Vec3::new(s, 0.0, -s),
        Vec3::new(s, 0.0, s),
        Vec3::new(-s, 0.0, s),
        Material::diffuse(Color::splat(albedo)),
    );
    scene.extend(scenes::quad_light(Vec3::new(0.0, 1.0, 0.0), s, 1, Color::ONE).into_triangles());
    Bvh::build(scene.into_triangles()).unwrap()
}

/// Rays looking straight down at the floor from just under the sky.
fn looking_down(x: u32, y: u32, _rng: &mut dyn RngCore) -> Ray {
    Ray::new(Vec3::new(x as f32 * 0.37 + 0.11, 0.5, y as f32 * 0.29 - 0.05), -Vec3::Y)
}

fn mean(pixels: &[Color]) -> Color {
    pixels.iter().copied().sum::<Color>() / pixels.len() as f32
}

#[test]
fn quad_light_is_exact() {
    // A pinhole camera looking down -Z at a 1x1 emitter three units away
    let (width, height) = (16, 12);
    let hfov: f32 = 60.0;
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
        .with_fov(hfov);
    camera.initialize().unwrap();

    let distance = 3.0;
    let half = 0.5;
    let scene = scenes::quad_light(Vec3::new(0.0, 0.0, -distance), half, 2, Color::splat(EMISSION));
    let bvh = Bvh::build(scene.into_triangles()).unwrap();

    let samples = 4;
    let mut rng = StdRng::seed_from_u64(1);
    let config = TraceConfig::default();
    let image = render_samples(&bvh, &camera, (width, height), samples, &config, &mut rng);

    // Pixel cells on the unit-distance image plane; the quad spans
    // [-half / distance, half / distance] on both axes there
    let cell = 2.0 * (hfov.to_radians() / 2.0).tan() / width as f32;
    let edge = half / distance;
    let margin = 1e-3;
    let span = |i: u32, n: u32| {
        let lo = i as f32 * cell - n as f32 * cell / 2.0;
        (lo, lo + cell)
    };
    let inside = |(lo, hi): (f32, f32)| lo > -edge + margin && hi < edge - margin;
    let outside = |(lo, hi): (f32, f32)| hi < -edge - margin || lo > edge + margin;

    let (mut covered, mut missed) = (0, 0);
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = (span(x, width), span(y, height));
            let pixel = image.get(x, y).unwrap();
            if inside(sx) && inside(sy) {
                assert_eq!(pixel, Color::splat(samples as f32 * EMISSION), "pixel ({x}, {y})");
                covered += 1;
            } else if outside(sx) || outside(sy) {
                assert_eq!(pixel, Color::ZERO, "pixel ({x}, {y})");
                missed += 1;
            }
        }
    }
    assert!(covered >= 9, "covered {covered}");
    assert!(missed > 100, "missed {missed}");
}

#[test]
fn emitters_terminate_paths() {
    // Extra depth budget must not change what an emitter returns
    let bvh = light_wall();
    let mut rng = StdRng::seed_from_u64(2);
    for depth in [1, 5, 50] {
        let config = TraceConfig {
            max_depth: depth,
            ..Default::default()
        };
        let image = render_samples(&bvh, &straight_ahead, (2, 2), 1, &config, &mut rng);
        assert!(image.pixels().iter().all(|&p| p == Color::splat(EMISSION)));
    }
}

#[test]
fn full_sky_over_diffuse_floor_converges_to_albedo() {
    // Uniform hemisphere sampling with weight 2 * albedo * cos_theta
    // estimates albedo * L_e when the emitter fills the hemisphere.
    let albedo = 0.5;
    let bvh = floor_under_sky(albedo);
    let config = TraceConfig {
        max_depth: 2,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(3);

    let samples = 2_000;
    let mut image = render_samples(&bvh, &looking_down, (4, 4), samples, &config, &mut rng);
    image.divide(samples as f32);

    let m = mean(image.pixels());
    assert!((m - Color::splat(albedo)).abs().max_element() < 0.01, "mean {m}");
}

#[test]
fn floor_estimate_is_stable_when_doubling_samples() {
    let bvh = floor_under_sky(0.8);
    let config = TraceConfig {
        max_depth: 3,
        ..Default::default()
    };

    let estimate = |samples: u32, seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut image = render_samples(&bvh, &looking_down, (4, 4), samples, &config, &mut rng);
        image.divide(samples as f32);
        mean(image.pixels())
    };

    let once = estimate(1_000, 10);
    let twice = estimate(2_000, 20);
    assert!((once - twice).abs().max_element() < 0.02, "{once} vs {twice}");
    assert!((twice - Color::splat(0.8)).abs().max_element() < 0.02);
}

#[test]
fn thread_limit_is_enforced() {
    let bvh = light_wall();
    let hw = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    assert_eq!(max_worker_threads(), hw - 1);

    // Asking for every core is one too many
    match render(&bvh, &straight_ahead, (2, 2), 2, hw) {
        Err(RenderError::ResourceLimitExceeded { requested, limit }) => {
            assert_eq!(requested, hw);
            assert_eq!(limit, hw - 1);
        }
        other => panic!("expected ResourceLimitExceeded, got {other:?}"),
    }

    let result = render(&bvh, &straight_ahead, (2, 2), 2, hw - 1);
    if hw >= 2 {
        assert!(result.is_ok());
    } else {
        assert!(matches!(result, Err(RenderError::InvalidArgument(_))));
    }
}

#[test]
fn every_sample_is_rendered_exactly_once() {
    // An uneven split: some workers get one more sample than others
    let samples = 7;
    let shares = distribute_samples(samples, 3);
    assert_eq!(shares.iter().sum::<u32>(), samples);

    // Each path returns EMISSION exactly, so a lost or doubled sample
    // would move the normalized result away from it
    let bvh = light_wall();
    let config = TraceConfig::default();
    let mut image = Image::new(5, 4);
    for (worker, &share) in shares.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(worker as u64);
        let partial = render_samples(&bvh, &straight_ahead, (5, 4), share, &config, &mut rng);
        image.accumulate(&partial).unwrap();
    }
    image.divide(samples as f32);
    assert!(image.pixels().iter().all(|&p| p == Color::splat(EMISSION)));

    // The same split through the worker pool, where the host has cores to spare
    let limit = max_worker_threads();
    if limit > 0 {
        let image = render(&bvh, &straight_ahead, (5, 4), samples, limit.min(3)).unwrap();
        assert!(image.pixels().iter().all(|&p| p == Color::splat(EMISSION)));
    }
}

#[test]
fn renders_are_reproducible_for_a_seed() {
    let (scene, view) = scenes::cornell_box();
    let bvh = Bvh::build(scene.into_triangles()).unwrap();
    let camera = Camera::from_viewpoint(&view, 12, 9).unwrap();

    let config = TraceConfig::default();
    let single = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        render_samples(&bvh, &camera, (12, 9), 6, &config, &mut rng)
    };
    let a = single(1234);
    assert_eq!(a, single(1234));
    assert_ne!(a, single(4321));
    assert!(a.pixels().iter().all(|p| p.is_finite() && p.min_element() >= 0.0));
    assert!(a.pixels().iter().any(|&p| p != Color::ZERO));

    let limit = max_worker_threads();
    if limit > 0 {
        let config = RenderConfig {
            samples: 6,
            threads: limit.min(2),
            seed: 1234,
            ..Default::default()
        };
        let a = render_with(&bvh, &camera, (12, 9), &config).unwrap();
        let b = render_with(&bvh, &camera, (12, 9), &config).unwrap();
        assert_eq!(a, b);
    }
}
