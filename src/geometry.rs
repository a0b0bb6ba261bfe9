//! Grid-to-pixel geometry and the reserved logo region.

/// Fraction of the module count, per side, kept free for a logo.
pub const RESERVED_FRACTION: f64 = 0.3;

/// A centered square of modules left unpainted so a logo can occupy it.
///
/// Rows and columns are half-open ranges: `row_start..row_end`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ReservedRegion {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl ReservedRegion {
    /// Computes the reserved region for a grid of `module_count` modules per side.
    ///
    /// `size = floor(module_count * 0.3)`, `start = floor((module_count - size) / 2)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsynth::geometry::ReservedRegion;
    ///
    /// let region = ReservedRegion::for_module_count(49);
    /// assert_eq!((region.row_start, region.row_end), (17, 31));
    /// ```
    pub fn for_module_count(module_count: usize) -> Self {
        let size = (module_count as f64 * RESERVED_FRACTION).floor() as usize;
        let start = (module_count - size) / 2;
        let end = start + size;
        Self {
            row_start: start,
            row_end: end,
            col_start: start,
            col_end: end,
        }
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Whether the module at `(row, col)` falls inside the region.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row) && (self.col_start..self.col_end).contains(&col)
    }
}

/// Maps module indices onto a square pixel surface.
///
/// Module `i` covers pixels `edge(i)..edge(i + 1)`, where
/// `edge(i) = floor(i * surface_size / module_count)`, so neighbouring modules
/// share an edge and the grid tiles the surface with no gaps or overlaps.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ModuleLayout {
    surface_size: u32,
    module_count: usize,
}

impl ModuleLayout {
    pub fn new(surface_size: u32, module_count: usize) -> Self {
        Self { surface_size, module_count }
    }

    pub fn surface_size(&self) -> u32 {
        self.surface_size
    }

    /// Width of one module in pixels (usually fractional).
    pub fn module_size(&self) -> f64 {
        f64::from(self.surface_size) / self.module_count as f64
    }

    /// Pixel coordinate of the leading edge of module `index`.
    pub fn edge(&self, index: usize) -> u32 {
        let px = index as u64 * u64::from(self.surface_size) / self.module_count as u64;
        px as u32
    }

    /// Pixel span `(start, end)` covered by module `index`.
    pub fn span(&self, index: usize) -> (u32, u32) {
        (self.edge(index), self.edge(index + 1))
    }

    /// The square pixel footprint for a logo covering `region`, centered on the surface.
    pub fn logo_footprint(&self, region: &ReservedRegion) -> LogoFootprint {
        let size = region.size() as f64 * self.module_size();
        let origin = (f64::from(self.surface_size) - size) / 2.0;
        let radius = self.module_size().min(size * 0.1);
        LogoFootprint { x: origin, y: origin, size, radius }
    }
}

/// Where the logo and its background go, in (fractional) pixels.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LogoFootprint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Corner radius of the rounded background and clip.
    pub radius: f64,
}

impl LogoFootprint {
    /// Whether the pixel center `(px + 0.5, py + 0.5)` lies inside the rounded square.
    pub fn contains_pixel(&self, px: u32, py: u32) -> bool {
        let x = f64::from(px) + 0.5;
        let y = f64::from(py) + 0.5;
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.size, self.y + self.size);
        if x < x0 || x >= x1 || y < y0 || y >= y1 {
            return false;
        }
        let r = self.radius;
        if r <= 0.0 {
            return true;
        }
        // Distance from the nearest corner circle center, only in the corner boxes.
        let cx = if x < x0 + r {
            x0 + r
        } else if x > x1 - r {
            x1 - r
        } else {
            return true;
        };
        let cy = if y < y0 + r {
            y0 + r
        } else if y > y1 - r {
            y1 - r
        } else {
            return true;
        };
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= r * r
    }
}
