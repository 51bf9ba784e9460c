//! Pinhole camera and the ray-generation seam used by the scheduler.

use lux_core::scenes::Viewpoint;
use lux_math::{Ray, Vec3, EPSILON};
use rand::{Rng, RngCore};

use crate::{RenderError, RenderResult};

/// Anything that can produce a primary ray for a pixel.
///
/// Pixel `(0, 0)` is the lower-left corner of the image. Implementations are
/// shared by every worker thread, hence `Sync`. Closures of the matching
/// shape implement this trait, which is handy for synthetic test cameras.
pub trait RayGenerator: Sync {
    fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray;

    /// The resolution the generator was set up for, if it has one. A render
    /// at any other resolution is rejected.
    fn fixed_resolution(&self) -> Option<(u32, u32)> {
        None
    }
}

impl<F> RayGenerator for F
where
    F: Fn(u32, u32, &mut dyn RngCore) -> Ray + Sync,
{
    fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        self(x, y, rng)
    }
}

/// Pinhole camera for generating rays into the scene.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    /// Horizontal field of view in degrees
    hfov: f32,

    // Cached computed values (set by initialize())
    u: Vec3,
    v: Vec3,
    w: Vec3,
    viewport_width: f32,
    viewport_height: f32,
    cell_size: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 512,
            image_height: 512,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            hfov: 60.0,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            viewport_width: 0.0,
            viewport_height: 0.0,
            cell_size: 0.0,
        }
    }

    /// Camera for a built-in scene's viewpoint, already initialized.
    pub fn from_viewpoint(view: &Viewpoint, width: u32, height: u32) -> RenderResult<Self> {
        let mut camera = Self::new()
            .with_resolution(width, height)
            .with_position(view.look_from, view.look_at, view.up)
            .with_fov(view.fov_degrees);
        camera.initialize()?;
        Ok(camera)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set the horizontal field of view, in degrees.
    pub fn with_fov(mut self, hfov: f32) -> Self {
        self.hfov = hfov;
        self
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Derive the camera frame and image plane.
    ///
    /// The image plane sits at unit distance; its width spans the horizontal
    /// field of view and its height follows the image aspect ratio.
    pub fn initialize(&mut self) -> RenderResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "camera resolution {}x{} has no pixels",
                self.image_width, self.image_height
            )));
        }
        if !(self.hfov > 0.0 && self.hfov < 180.0) {
            return Err(RenderError::InvalidArgument(format!(
                "field of view {} must be in (0, 180) degrees",
                self.hfov
            )));
        }

        let w = (self.look_from - self.look_at).normalize_or_zero();
        let right = self.vup.cross(w);
        if w == Vec3::ZERO || right.length() < EPSILON {
            return Err(RenderError::InvalidArgument(
                "camera view direction is degenerate or parallel to its up vector".to_string(),
            ));
        }

        self.w = w;
        self.u = right.normalize();
        self.v = self.w.cross(self.u);

        self.viewport_width = 2.0 * (self.hfov.to_radians() / 2.0).tan();
        self.viewport_height =
            self.viewport_width * self.image_height as f32 / self.image_width as f32;
        self.cell_size = self.viewport_width / self.image_width as f32;
        Ok(())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl RayGenerator for Camera {
    /// Ray through a uniformly jittered point of pixel `(x, y)`.
    fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let px = (x as f32 + rng.gen::<f32>()) * self.cell_size - self.viewport_width / 2.0;
        let py = (y as f32 + rng.gen::<f32>()) * self.cell_size - self.viewport_height / 2.0;

        let direction = (px * self.u + py * self.v - self.w).normalize();
        Ray::new(self.look_from, direction)
    }

    fn fixed_resolution(&self) -> Option<(u32, u32)> {
        Some(self.resolution())
    }
}
