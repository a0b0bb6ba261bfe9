//! Per-request customization and engine configuration.

use std::time::Duration;

use image::Rgba;

use crate::error::{QrError, Result};

/// Side length of the rendered PNG in pixels, independent of version.
pub const SURFACE_SIZE: u32 = 1024;

/// Largest accepted quiet-zone margin, in modules.
pub const MAX_MARGIN: u32 = 10;

pub const DEFAULT_DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const DEFAULT_LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const DEFAULT_MARGIN: u32 = 4;

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
///
/// # Example
///
/// ```rust
/// use qrsynth::config::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#ff8000").unwrap().0, [255, 128, 0, 255]);
/// assert_eq!(parse_hex_color("fff").unwrap().0, [255, 255, 255, 255]);
/// assert!(parse_hex_color("#12345").is_err());
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || QrError::Validation(format!("invalid hex color: {}", hex));
    if !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match digits.len() {
        3 => {
            let mut rgba = [255u8; 4];
            for (i, c) in digits.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                rgba[i] = v * 17;
            }
            Ok(Rgba(rgba))
        }
        6 | 8 => {
            let a = if digits.len() == 8 { channel(&digits[6..8])? } else { 255 };
            Ok(Rgba([channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?, a]))
        }
        _ => Err(invalid()),
    }
}

/// Formats a color as `#rrggbb`, dropping alpha.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Where logo bytes come from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LogoSource {
    /// Raw encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// A `data:image/...;base64,...` URI.
    DataUri(String),
}

/// Visual options for one generation request.
///
/// Immutable once built; the engine never keeps customization between calls.
#[derive(Clone, PartialEq, Debug)]
pub struct CustomizationOptions {
    pub dark_color: Rgba<u8>,
    pub light_color: Rgba<u8>,
    /// Quiet zone in modules (0..=10). Used by the SVG export path; the raster
    /// renderer fills the whole surface with modules.
    pub margin: u32,
    pub logo: Option<LogoSource>,
}

impl Default for CustomizationOptions {
    fn default() -> Self {
        Self {
            dark_color: DEFAULT_DARK,
            light_color: DEFAULT_LIGHT,
            margin: DEFAULT_MARGIN,
            logo: None,
        }
    }
}

impl CustomizationOptions {
    /// Builds options from hex color strings, validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Validation`] for a malformed color or a margin above 10.
    pub fn from_hex(dark: &str, light: &str, margin: u32, logo: Option<LogoSource>) -> Result<Self> {
        let options = Self {
            dark_color: parse_hex_color(dark)?,
            light_color: parse_hex_color(light)?,
            margin,
            logo,
        };
        options.validate()?;
        Ok(options)
    }

    /// Checks the invariants that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Validation`] if the margin is above 10.
    pub fn validate(&self) -> Result<()> {
        if self.margin > MAX_MARGIN {
            return Err(QrError::Validation(format!(
                "margin must be between 0 and {}, got {}",
                MAX_MARGIN, self.margin
            )));
        }
        Ok(())
    }

    pub fn with_logo(mut self, logo: LogoSource) -> Self {
        self.logo = Some(logo);
        self
    }

    /// The same options with default colors and no logo, as used by the degraded tiers.
    pub fn plain(&self) -> Self {
        Self {
            margin: self.margin,
            ..Self::default()
        }
    }
}

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Side length of the square output image.
    pub surface_size: u32,
    /// How long to wait for a logo to decode before giving up on it.
    pub logo_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface_size: SURFACE_SIZE,
            logo_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    pub fn with_logo_timeout(mut self, timeout: Duration) -> Self {
        self.logo_timeout = timeout;
        self
    }

    pub fn with_surface_size(mut self, size: u32) -> Self {
        self.surface_size = size;
        self
    }
}
