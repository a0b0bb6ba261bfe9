//! Module grid encoding.
//!
//! The bit-level QR algorithm (segmentation, Reed–Solomon, placement, masking)
//! lives in the `qrcode` crate. This module wraps it behind [`MatrixEncoder`]
//! and hands the rest of the pipeline a plain [`ModuleGrid`].

use qrcode::types::QrError as EncodeError;
use qrcode::{Color, QrCode};
use tracing::debug;

use crate::error::{QrError, Result};
use crate::version::{EncodingParameters, QrCodeEcc, Version};

/// A square grid of dark (`true`) and light (`false`) modules, row-major.
///
/// Immutable after construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleGrid {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Builds a grid of `size × size` modules, asking `is_dark(row, col)` for each cell.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsynth::encoder::ModuleGrid;
    ///
    /// let checker = ModuleGrid::from_fn(4, |row, col| (row + col) % 2 == 0);
    /// assert!(checker.is_dark(0, 0));
    /// assert!(!checker.is_dark(0, 1));
    /// ```
    pub fn from_fn(size: usize, mut is_dark: impl FnMut(usize, usize) -> bool) -> Self {
        let mut modules = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                modules.push(is_dark(row, col));
            }
        }
        Self { size, modules }
    }

    fn from_qr(code: &QrCode) -> Self {
        let size = code.width();
        let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Self { size, modules }
    }

    /// The number of modules per side.
    pub fn module_count(&self) -> usize {
        self.size
    }

    /// Returns the color of the module at the given row and column.
    /// Coordinates outside the grid are light.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// The QR version matching this grid's size, if it is a standard size.
    pub fn version(&self) -> Option<Version> {
        if self.size < Version::MIN.module_count() || (self.size - 17) % 4 != 0 {
            return None;
        }
        u8::try_from((self.size - 17) / 4)
            .ok()
            .filter(|&v| v <= Version::MAX.value())
            .map(Version::new)
    }

    /// Number of dark modules in the grid.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&dark| dark).count()
    }
}

/// A capability that turns content into a module grid.
///
/// Implementations may return a grid larger than requested when the content
/// does not fit the requested version; callers must read the size from the
/// returned grid.
pub trait MatrixEncoder {
    /// Encodes `content` at `params.version` or the smallest larger version that fits.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Encoding`] if the content does not fit any version up to 40.
    fn encode(&self, content: &str, params: EncodingParameters) -> Result<ModuleGrid>;

    /// Encodes `content` at the smallest version that fits at the given level.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Encoding`] if the content does not fit any version up to 40.
    fn encode_auto(&self, content: &str, ecc: QrCodeEcc) -> Result<ModuleGrid>;
}

/// [`MatrixEncoder`] backed by the `qrcode` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrcodeEncoder;

impl MatrixEncoder for QrcodeEncoder {
    fn encode(&self, content: &str, params: EncodingParameters) -> Result<ModuleGrid> {
        let mut version = Some(params.version);
        while let Some(ver) = version {
            match QrCode::with_version(
                content,
                qrcode::Version::Normal(i16::from(ver.value())),
                params.ecc.into(),
            ) {
                Ok(code) => {
                    if ver != params.version {
                        debug!(
                            requested = params.version.value(),
                            actual = ver.value(),
                            "content did not fit requested version, upgraded"
                        );
                    }
                    return Ok(ModuleGrid::from_qr(&code));
                }
                Err(EncodeError::DataTooLong) => version = ver.next(),
                Err(err) => return Err(err.into()),
            }
        }
        Err(QrError::Encoding(format!(
            "content of {} bytes exceeds version 40 capacity at ECC {}",
            content.len(),
            params.ecc.letter()
        )))
    }

    fn encode_auto(&self, content: &str, ecc: QrCodeEcc) -> Result<ModuleGrid> {
        let code = QrCode::with_error_correction_level(content, ecc.into())?;
        Ok(ModuleGrid::from_qr(&code))
    }
}
