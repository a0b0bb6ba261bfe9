//! Rasterizing a module grid onto a surface.

use image::Rgba;
use tracing::debug;

use crate::encoder::ModuleGrid;
use crate::error::Result;
use crate::geometry::{ModuleLayout, ReservedRegion};
use crate::surface::RenderSurface;

/// A grid painted onto a surface, plus the geometry the logo step needs.
#[derive(Debug)]
pub struct RenderedGrid<S> {
    pub surface: S,
    pub layout: ModuleLayout,
    /// Number of module rectangles painted dark.
    pub painted: usize,
}

/// Paints module grids onto fixed-size square surfaces.
#[derive(Clone, Copy, Debug)]
pub struct CanvasRenderer {
    surface_size: u32,
}

impl CanvasRenderer {
    pub fn new(surface_size: u32) -> Self {
        Self { surface_size }
    }

    /// Fills a fresh surface with `light`, then paints every dark module outside
    /// `reserved` with `dark`. Module edges are integer pixels shared by
    /// neighbours, so the grid covers the surface exactly with no anti-aliasing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QrError::Render`] if the surface cannot be allocated.
    pub fn render<S: RenderSurface>(
        &self,
        grid: &ModuleGrid,
        reserved: Option<&ReservedRegion>,
        dark: Rgba<u8>,
        light: Rgba<u8>,
    ) -> Result<RenderedGrid<S>> {
        let mut surface = S::allocate(self.surface_size, self.surface_size, light)?;
        let count = grid.module_count();
        let layout = ModuleLayout::new(self.surface_size, count);

        let mut painted = 0;
        for row in 0..count {
            let (y0, y1) = layout.span(row);
            for col in 0..count {
                if reserved.is_some_and(|r| r.contains(row, col)) {
                    continue;
                }
                if grid.is_dark(row, col) {
                    let (x0, x1) = layout.span(col);
                    surface.fill_rect(x0, y0, x1 - x0, y1 - y0, dark);
                    painted += 1;
                }
            }
        }
        debug!(
            module_count = count,
            module_size = layout.module_size(),
            painted,
            reserved = reserved.map(ReservedRegion::size),
            "rendered module grid"
        );

        Ok(RenderedGrid { surface, layout, painted })
    }
}
