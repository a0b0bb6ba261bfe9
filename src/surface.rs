//! Drawing surfaces.
//!
//! The renderer and compositor only talk to [`RenderSurface`]; [`RasterSurface`]
//! is the software implementation on top of the `image` crate.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgba, RgbaImage};

use crate::error::{QrError, Result};
use crate::geometry::LogoFootprint;

/// Largest surface side we agree to allocate.
pub const MAX_SURFACE_SIZE: u32 = 8192;

/// A pixel surface the pipeline can paint onto and export.
pub trait RenderSurface: Sized {
    /// Acquires a `width × height` surface filled with `background`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Render`] if no surface can be acquired.
    fn allocate(width: u32, height: u32, background: Rgba<u8>) -> Result<Self>;

    fn dimensions(&self) -> (u32, u32);

    /// Paints the axis-aligned rectangle `[x, x + w) × [y, y + h)`, clamped to the surface.
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>);

    /// Paints the rounded square described by `footprint`.
    fn fill_rounded(&mut self, footprint: &LogoFootprint, color: Rgba<u8>);

    /// Scales `image` to the footprint's square and draws it clipped to the rounded corners.
    fn draw_clipped_image(&mut self, image: &RgbaImage, footprint: &LogoFootprint);

    /// Encodes the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Render`] if encoding fails.
    fn encode_png(&self) -> Result<Vec<u8>>;
}

/// In-memory RGBA surface.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    img: RgbaImage,
}

impl RasterSurface {
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Pixel range `[floor(start), ceil(start + len))` clamped to `0..limit`.
    fn covered(start: f64, len: f64, limit: u32) -> std::ops::Range<u32> {
        let lo = start.floor().max(0.0) as u32;
        let hi = (start + len).ceil().max(0.0) as u32;
        lo.min(limit)..hi.min(limit)
    }
}

impl RenderSurface for RasterSurface {
    fn allocate(width: u32, height: u32, background: Rgba<u8>) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_SURFACE_SIZE || height > MAX_SURFACE_SIZE {
            return Err(QrError::Render(format!(
                "cannot allocate a {}x{} surface",
                width, height
            )));
        }
        Ok(Self {
            img: ImageBuffer::from_pixel(width, height, background),
        })
    }

    fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let (width, height) = self.img.dimensions();
        for py in y..y.saturating_add(h).min(height) {
            for px in x..x.saturating_add(w).min(width) {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    fn fill_rounded(&mut self, footprint: &LogoFootprint, color: Rgba<u8>) {
        let (width, height) = self.img.dimensions();
        for py in Self::covered(footprint.y, footprint.size, height) {
            for px in Self::covered(footprint.x, footprint.size, width) {
                if footprint.contains_pixel(px, py) {
                    self.img.put_pixel(px, py, color);
                }
            }
        }
    }

    fn draw_clipped_image(&mut self, image: &RgbaImage, footprint: &LogoFootprint) {
        let side = footprint.size.round().max(1.0) as u32;
        // Non-square logos are stretched, not letterboxed.
        let scaled = imageops::resize(image, side, side, FilterType::Lanczos3);
        let ox = footprint.x.round() as i64;
        let oy = footprint.y.round() as i64;

        let (width, height) = self.img.dimensions();
        for py in Self::covered(footprint.y, footprint.size, height) {
            for px in Self::covered(footprint.x, footprint.size, width) {
                if !footprint.contains_pixel(px, py) {
                    continue;
                }
                let sx = i64::from(px) - ox;
                let sy = i64::from(py) - oy;
                if sx < 0 || sy < 0 || sx >= i64::from(side) || sy >= i64::from(side) {
                    continue;
                }
                let src = scaled.get_pixel(sx as u32, sy as u32);
                self.img.get_pixel_mut(px, py).blend(src);
            }
        }
    }

    fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.img.write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}
