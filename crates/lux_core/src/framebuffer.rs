//! Linear-radiance framebuffer.
//!
//! Pixels are stored row-major with row 0 at the *bottom* of the picture,
//! matching the camera, whose pixel `(0, 0)` looks at the lower-left corner.
//! Encoders flip rows so written files are top-down.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ColorType, ImageFormat};
use lux_math::Vec3;
use thiserror::Error;

use crate::Color;

/// Errors raised by framebuffer access and encoding.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Pixel ({x}, {y}) out of range for {width}x{height} image")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Image resolution mismatch: expected {expected:?}, found {found:?}")]
    ResolutionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A grid of linear RGB radiance values.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Image {
    /// Create a new image filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixels in row-major order, bottom row first.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable pixels in row-major order, bottom row first.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn index(&self, x: u32, y: u32) -> ImageResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(ImageError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> ImageResult<Color> {
        let i = self.index(x, y)?;
        Ok(self.pixels[i])
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> ImageResult<()> {
        let i = self.index(x, y)?;
        self.pixels[i] = color;
        Ok(())
    }

    /// Add `color` to the pixel at (x, y).
    pub fn add(&mut self, x: u32, y: u32, color: Color) -> ImageResult<()> {
        let i = self.index(x, y)?;
        self.pixels[i] += color;
        Ok(())
    }

    /// Elementwise sum of another image of the same resolution into this one.
    pub fn accumulate(&mut self, other: &Image) -> ImageResult<()> {
        if self.resolution() != other.resolution() {
            return Err(ImageError::ResolutionMismatch {
                expected: self.resolution(),
                found: other.resolution(),
            });
        }
        for (dst, src) in self.pixels.iter_mut().zip(&other.pixels) {
            *dst += *src;
        }
        Ok(())
    }

    /// Divide every pixel by `scalar`.
    pub fn divide(&mut self, scalar: f32) {
        for p in &mut self.pixels {
            *p /= scalar;
        }
    }

    /// Raise every component to `1 / gamma`. Negative values clamp to zero.
    pub fn gamma_correct(&mut self, gamma: f32) {
        let exponent = 1.0 / gamma;
        for p in &mut self.pixels {
            *p = p.max(Vec3::ZERO).powf(exponent);
        }
    }

    /// Convert to 8-bit RGB, top row first, components clamped to [0, 1].
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for row in self.pixels.chunks_exact(self.width.max(1) as usize).rev() {
            for color in row {
                let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
                bytes.extend_from_slice(&[c.x as u8, c.y as u8, c.z as u8]);
            }
        }
        bytes
    }

    /// Encode as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_rgb8(),
            self.width,
            self.height,
            ColorType::Rgb8,
            ImageFormat::Png,
        )?;
        Ok(())
    }

    /// Encode as binary PPM (P6).
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(&self.to_rgb8())?;
        writer.flush()?;
        Ok(())
    }
}
