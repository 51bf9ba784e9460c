//! Sample-parallel rendering.
//!
//! The samples of every pixel are divided among a fixed number of workers.
//! Each worker renders the whole image with its share into a private
//! framebuffer using its own random stream, so workers never synchronize.
//! When all have finished their images are summed and divided by the total
//! sample count.

use std::time::Instant;

use lux_core::Image;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::{
    trace_with, RayGenerator, RenderConfig, RenderError, RenderResult, TraceBackend, TraceConfig,
};

/// Golden-ratio increment separating the per-worker seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Largest worker count a render may request: one less than the available
/// hardware parallelism, leaving a core for the calling thread.
pub fn max_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
}

/// Split `samples` among `workers`: everyone gets `samples / workers`, and
/// the first `samples % workers` workers one more.
pub fn distribute_samples(samples: u32, workers: usize) -> Vec<u32> {
    if workers == 0 {
        return Vec::new();
    }
    let base = samples / workers as u32;
    let extra = (samples % workers as u32) as usize;
    (0..workers)
        .map(|i| base + u32::from(i < extra))
        .collect()
}

/// Render an image of `resolution` with `samples` per pixel across
/// `threads` workers, using default integrator settings.
pub fn render<B, G>(
    scene: &B,
    camera: &G,
    resolution: (u32, u32),
    samples: u32,
    threads: usize,
) -> RenderResult<Image>
where
    B: TraceBackend + ?Sized,
    G: RayGenerator + ?Sized,
{
    let config = RenderConfig {
        samples,
        threads,
        ..Default::default()
    };
    render_with(scene, camera, resolution, &config)
}

/// [`render`] driven by a full [`RenderConfig`].
///
/// Fails with [`RenderError::InvalidArgument`] for a zero resolution, sample
/// count or thread count, or a resolution the camera was not set up for; and
/// with [`RenderError::ResourceLimitExceeded`]
/// when more threads are requested than [`max_worker_threads`] allows. The
/// result is deterministic for a given seed and thread count.
pub fn render_with<B, G>(
    scene: &B,
    camera: &G,
    resolution: (u32, u32),
    config: &RenderConfig,
) -> RenderResult<Image>
where
    B: TraceBackend + ?Sized,
    G: RayGenerator + ?Sized,
{
    let (width, height) = resolution;
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidArgument(format!(
            "resolution {}x{} has no pixels",
            width, height
        )));
    }
    if let Some(expected) = camera.fixed_resolution() {
        if expected != resolution {
            return Err(RenderError::InvalidArgument(format!(
                "camera is set up for {}x{} but the render is {}x{}",
                expected.0, expected.1, width, height
            )));
        }
    }
    if config.samples == 0 {
        return Err(RenderError::InvalidArgument(
            "samples per pixel must be positive".to_string(),
        ));
    }
    if config.threads == 0 {
        return Err(RenderError::InvalidArgument(
            "thread count must be positive".to_string(),
        ));
    }
    let limit = max_worker_threads();
    if config.threads > limit {
        return Err(RenderError::ResourceLimitExceeded {
            requested: config.threads,
            limit,
        });
    }

    let shares = distribute_samples(config.samples, config.threads);
    let trace_config = config.trace_config();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("lux-worker-{}", i))
        .build()?;

    log::info!(
        "Rendering {}x{} at {} spp on {} threads (depth {}, seed {})",
        width,
        height,
        config.samples,
        config.threads,
        config.max_depth,
        config.seed
    );
    let start = Instant::now();

    let partials = pool.install(|| {
        shares
            .par_iter()
            .enumerate()
            .map(|(worker, &share)| {
                let worker_start = Instant::now();
                let mut rng = StdRng::seed_from_u64(worker_seed(config.seed, worker));
                let image =
                    render_samples(scene, camera, resolution, share, &trace_config, &mut rng);
                log::debug!(
                    "Worker {} finished {} samples in {:.2?}",
                    worker,
                    share,
                    worker_start.elapsed()
                );
                image
            })
            .collect::<Vec<Image>>()
    });

    let mut image = Image::new(width, height);
    for partial in &partials {
        image.accumulate(partial)?;
    }
    image.divide(config.samples as f32);

    log::info!("Render complete in {:.2?}", start.elapsed());
    Ok(image)
}

/// Trace `samples` paths through every pixel on the calling thread and
/// return their unnormalized sum.
///
/// This is the body of one worker; on its own it gives a single-threaded
/// render (divide by `samples` to normalize).
pub fn render_samples<B, G>(
    scene: &B,
    camera: &G,
    resolution: (u32, u32),
    samples: u32,
    config: &TraceConfig,
    rng: &mut dyn RngCore,
) -> Image
where
    B: TraceBackend + ?Sized,
    G: RayGenerator + ?Sized,
{
    let (width, height) = resolution;
    let mut image = Image::new(width, height);
    let mut pixels = image.pixels_mut().iter_mut();

    for y in 0..height {
        for x in 0..width {
            let Some(pixel) = pixels.next() else {
                continue;
            };
            for _ in 0..samples {
                let ray = camera.get_ray(x, y, rng);
                *pixel += trace_with(scene, ray, config, rng);
            }
        }
    }

    image
}

/// Seed of a worker's private random stream.
fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64 + 1).wrapping_mul(SEED_STRIDE)
}
