//! `lux` - render a scene to an image file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use lux_core::{load_obj, scenes, Color, Image, Material, Scene};
use lux_math::Vec3;
use lux_renderer::{render_with, Bvh, Camera, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "lux", version, about = "Monte Carlo path tracer")]
struct Args {
    /// `cornell` for the built-in Cornell box, or a path to a Wavefront OBJ file
    #[arg(long, default_value = "cornell")]
    scene: String,

    /// JSON render configuration; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    depth: Option<u32>,

    /// Worker threads (at most one less than the number of cores)
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Horizontal field of view in degrees, for OBJ scenes
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    #[arg(long, default_value_t = 2.2)]
    gamma: f32,

    /// Output image; the extension selects PNG or PPM
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,
}

/// Output encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Png,
    Ppm,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("ppm") => Ok(OutputFormat::Ppm),
            _ => bail!("Unsupported output format for {} (use .png or .ppm)", path.display()),
        }
    }
}

/// Load the configuration file, if any, and apply flag overrides.
fn resolve_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Material palette for OBJ scenes, looked up by `usemtl` name.
fn obj_materials() -> HashMap<String, Material> {
    [
        ("white", Material::diffuse(Color::ONE)),
        ("grey", Material::diffuse(Color::splat(0.5))),
        ("red", Material::diffuse(Color::new(1.0, 0.0, 0.0))),
        ("green", Material::diffuse(Color::new(0.0, 1.0, 0.0))),
        ("blue", Material::diffuse(Color::new(0.0, 0.0, 1.0))),
        ("mirror", Material::mirror(Color::ONE)),
        ("metal", Material::specular(Color::splat(0.8), 0.2)),
        ("light", Material::emit(Color::ONE)),
    ]
    .into_iter()
    .map(|(name, material)| (name.to_string(), material))
    .collect()
}

/// Camera looking down -Z at the whole scene.
fn frame_scene(scene: &Scene, fov_degrees: f32, width: u32, height: u32) -> Result<Camera> {
    let bounds = scene.bounds();
    let center = bounds.centroid();
    let radius = (bounds.rt - bounds.lb).length() * 0.5;
    let distance = radius / (fov_degrees.to_radians() * 0.5).tan() * 1.1;

    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(center + Vec3::Z * distance.max(1.0), center, Vec3::Y)
        .with_fov(fov_degrees);
    camera.initialize()?;
    Ok(camera)
}

fn load_scene(args: &Args) -> Result<(Scene, Camera)> {
    if args.scene == "cornell" {
        let (scene, view) = scenes::cornell_box();
        let camera = Camera::from_viewpoint(&view, args.width, args.height)?;
        return Ok((scene, camera));
    }

    let triangles = load_obj(&args.scene, &obj_materials())
        .with_context(|| format!("Failed to load scene {}", args.scene))?;
    let mut scene = Scene::new();
    scene.extend(triangles);
    let camera = frame_scene(&scene, args.fov, args.width, args.height)?;
    Ok((scene, camera))
}

fn save(image: &Image, path: &Path) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Png => image.save_png(path),
        OutputFormat::Ppm => image.save_ppm(path),
    }
    .with_context(|| format!("Failed to write {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    // Fail on a bad output path before spending time rendering
    OutputFormat::from_path(&args.output)?;
    let config = resolve_config(args)?;

    let (scene, camera) = load_scene(args)?;
    if scene.is_empty() {
        bail!("Scene {} contains no triangles", args.scene);
    }
    log::info!("Scene '{}': {} triangles", args.scene, scene.len());

    let start = Instant::now();
    let bvh = Bvh::build(scene.into_triangles())?;
    log::info!(
        "BVH built in {:.2?} ({} nodes)",
        start.elapsed(),
        bvh.nodes().len()
    );

    let mut image = render_with(&bvh, &camera, camera.resolution(), &config)?;
    image.gamma_correct(args.gamma);

    save(&image, &args.output)?;
    log::info!("Saved {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    run(&args)
}
