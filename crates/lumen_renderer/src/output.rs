//! Linear RGB image buffers, display conversion and file output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::brdf::Color;
use crate::error::{RenderError, RenderResult};

/// Display gamma applied when converting to 8-bit.
pub const DISPLAY_GAMMA: f64 = 2.2;

/// Convert a linear component to an 8-bit display value.
#[inline]
pub fn to_display_byte(linear: f64) -> u8 {
    (255.0 * linear.clamp(0.0, 1.0).powf(1.0 / DISPLAY_GAMMA)).round() as u8
}

/// Linear RGB image, three `f32` per pixel, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; Self::len_for(width, height)],
        }
    }

    /// Wrap an existing float buffer, checking its length.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> RenderResult<Self> {
        let expected = Self::len_for(width, height);
        if data.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Floats needed for a `width` x `height` image.
    pub fn len_for(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// Pixel at column `x` of memory row `row` (0 is the top).
    pub fn get(&self, x: u32, row: u32) -> Color {
        let i = (row as usize * self.width as usize + x as usize) * 3;
        Color::new(self.data[i] as f64, self.data[i + 1] as f64, self.data[i + 2] as f64)
    }

    pub fn set(&mut self, x: u32, row: u32, color: Color) {
        let i = (row as usize * self.width as usize + x as usize) * 3;
        self.data[i] = color.x as f32;
        self.data[i + 1] = color.y as f32;
        self.data[i + 2] = color.z as f32;
    }

    /// Gamma-corrected 8-bit RGB, same row order.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data.iter().map(|&c| to_display_byte(c as f64)).collect()
    }

    /// Write a plain-text `P3` PPM.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;
        for pixel in self.to_rgb8().chunks_exact(3) {
            write!(writer, "{} {} {} ", pixel[0], pixel[1], pixel[2])?;
        }
        writeln!(writer)?;
        writer.flush()
    }

    /// Save to disk. `.ppm` is written directly; other extensions go
    /// through the `image` crate.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::ZeroDimension);
        }

        let is_ppm = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ppm"));
        if is_ppm {
            self.write_ppm(BufWriter::new(File::create(path)?))?;
        } else {
            image::save_buffer(
                path,
                &self.to_rgb8(),
                self.width,
                self.height,
                image::ColorType::Rgb8,
            )?;
        }

        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
