//! The generation pipeline and its fallback chain.
//!
//! A request moves through named states:
//!
//! ```text
//! Validate ─► SelectVersion ─► Encode ─┬─► RenderPlain ────┬─► Output
//!                                      └─► RenderWithLogo ─┘
//!    Encoding / Load error ─► Degrading(Degraded) ─► Degrading(Minimal) ─► Failed
//! ```
//!
//! | from                       | on                        | to                          |
//! |----------------------------|---------------------------|-----------------------------|
//! | `Validate`                 | empty content, bad option | `Failed(Validation)`        |
//! | `Encode`, `RenderWithLogo` | `Encoding` or `Load`      | `Degrading(Degraded)`       |
//! | `Degrading(Degraded)`      | `Encoding`                | `Degrading(Minimal)`        |
//! | `Degrading(Minimal)`       | `Encoding`                | `Failed(Encoding)`          |
//! | any render step            | `Render`                  | `Failed(Render)`, no retry  |
//!
//! The content is never altered; each tier only gives up visual customization.

use image::Rgba;
use tracing::{debug, error, warn};

use crate::config::{CustomizationOptions, EngineConfig};
use crate::encoder::{MatrixEncoder, ModuleGrid, QrcodeEncoder};
use crate::error::{QrError, Result};
use crate::geometry::ReservedRegion;
use crate::helper::to_data_uri;
use crate::logo;
use crate::render::CanvasRenderer;
use crate::surface::{RasterSurface, RenderSurface};
use crate::version::{self, EncodingParameters, QrCodeEcc};

/// How much of the requested customization made it into the image.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tier {
    /// Everything requested, including the logo when one was given.
    Full,
    /// Logo dropped, default colors, ECC M at the originally selected version.
    Degraded,
    /// Encoder-chosen version, ECC L, default colors.
    Minimal,
}

/// A successfully generated code.
#[derive(Clone, Debug)]
pub struct Generated {
    /// PNG bytes of the final image.
    pub png: Vec<u8>,
    /// The same image as `data:image/png;base64,...`.
    pub data_uri: String,
    pub tier: Tier,
    /// Parameters chosen by version selection for the original request.
    pub selected: EncodingParameters,
    /// Error-correction level of the grid that was drawn.
    pub ecc: QrCodeEcc,
    /// Modules per side of the grid that was drawn (may exceed the selected version's).
    pub module_count: usize,
    /// Reserved logo region, present only when a logo was composited.
    pub reserved: Option<ReservedRegion>,
    /// The error that forced degradation, if any.
    pub degraded_by: Option<QrError>,
}

/// Pipeline states. See the module docs for the transition table.
enum State {
    Validate,
    SelectVersion,
    Encode(EncodingParameters),
    RenderPlain { grid: ModuleGrid, selected: EncodingParameters },
    RenderWithLogo { grid: ModuleGrid, selected: EncodingParameters },
    Degrading { tier: Tier, cause: QrError, selected: EncodingParameters },
    Output(Generated),
    Failed(QrError),
}

/// Generates QR code images from content and customization options.
///
/// The engine holds only immutable configuration; every call allocates its own
/// grid and surface, so concurrent calls do not interfere. Callers fanning out
/// many calls should bound concurrency themselves, since each in-flight call
/// holds a full surface.
#[derive(Clone, Debug)]
pub struct QrEngine<E = QrcodeEncoder> {
    config: EngineConfig,
    encoder: E,
}

impl QrEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_encoder(config, QrcodeEncoder)
    }
}

impl Default for QrEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<E: MatrixEncoder> QrEngine<E> {
    /// Creates an engine that uses `encoder` for the module grid.
    pub fn with_encoder(config: EngineConfig, encoder: E) -> Self {
        Self { config, encoder }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates a PNG for `content` on an in-memory surface.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Validation`] for empty content or bad options,
    /// [`QrError::Encoding`] when even the minimal tier cannot encode the content,
    /// and [`QrError::Render`] when no surface is available.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrsynth::config::CustomizationOptions;
    /// use qrsynth::engine::{QrEngine, Tier};
    ///
    /// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
    /// let engine = QrEngine::default();
    /// let code = engine
    ///     .generate("https://example.com", &CustomizationOptions::default())
    ///     .await
    ///     .unwrap();
    /// assert!(code.data_uri.starts_with("data:image/png;base64,"));
    /// assert_eq!(code.tier, Tier::Full);
    /// # });
    /// ```
    pub async fn generate(&self, content: &str, options: &CustomizationOptions) -> Result<Generated> {
        self.generate_on::<RasterSurface>(content, options).await
    }

    /// Same as [`QrEngine::generate`], drawing on a caller-chosen surface type.
    ///
    /// # Errors
    ///
    /// See [`QrEngine::generate`].
    pub async fn generate_on<S: RenderSurface>(
        &self,
        content: &str,
        options: &CustomizationOptions,
    ) -> Result<Generated> {
        let mut state = State::Validate;
        loop {
            state = match state {
                State::Validate => match validate(content, options) {
                    Ok(()) => State::SelectVersion,
                    Err(err) => State::Failed(err),
                },
                State::SelectVersion => {
                    let selected = version::select(version::content_length(content), options.logo.is_some());
                    debug!(version = selected.version.value(), ecc = %selected.ecc.letter(), "selected encoding parameters");
                    State::Encode(selected)
                }
                State::Encode(selected) => match self.encoder.encode(content, selected) {
                    Ok(grid) if options.logo.is_some() => State::RenderWithLogo { grid, selected },
                    Ok(grid) => State::RenderPlain { grid, selected },
                    Err(cause) if cause.is_recoverable() => State::Degrading { tier: Tier::Degraded, cause, selected },
                    Err(err) => State::Failed(err),
                },
                State::RenderPlain { grid, selected } => {
                    match self.render_plain::<S>(&grid, options.dark_color, options.light_color) {
                        Ok(png) => State::Output(self.finish(png, Tier::Full, selected, selected.ecc, &grid, None, None)),
                        Err(err) => State::Failed(err),
                    }
                }
                State::RenderWithLogo { grid, selected } => match self.render_with_logo::<S>(&grid, options).await {
                    Ok((png, region)) => {
                        State::Output(self.finish(png, Tier::Full, selected, selected.ecc, &grid, Some(region), None))
                    }
                    Err(err) if err.is_recoverable() => State::Degrading { tier: Tier::Degraded, cause: err, selected },
                    Err(err) => State::Failed(err),
                },
                State::Degrading { tier, cause, selected } => {
                    warn!(?tier, error = %cause, "degrading QR generation");
                    let plain = options.plain();
                    let (attempt, ecc) = match tier {
                        Tier::Degraded => {
                            let params = EncodingParameters { version: selected.version, ecc: QrCodeEcc::Medium };
                            (self.encoder.encode(content, params), QrCodeEcc::Medium)
                        }
                        Tier::Minimal | Tier::Full => (self.encoder.encode_auto(content, QrCodeEcc::Low), QrCodeEcc::Low),
                    };
                    match attempt {
                        Ok(grid) => match self.render_plain::<S>(&grid, plain.dark_color, plain.light_color) {
                            Ok(png) => State::Output(self.finish(png, tier, selected, ecc, &grid, None, Some(cause))),
                            Err(err) => State::Failed(err),
                        },
                        Err(err) if tier == Tier::Degraded => State::Degrading { tier: Tier::Minimal, cause: err, selected },
                        Err(err) => State::Failed(err),
                    }
                }
                State::Output(generated) => return Ok(generated),
                State::Failed(err) => {
                    error!(error = %err, "QR generation failed");
                    return Err(err);
                }
            };
        }
    }

    fn render_plain<S: RenderSurface>(&self, grid: &ModuleGrid, dark: Rgba<u8>, light: Rgba<u8>) -> Result<Vec<u8>> {
        let rendered = CanvasRenderer::new(self.config.surface_size).render::<S>(grid, None, dark, light)?;
        rendered.surface.encode_png()
    }

    async fn render_with_logo<S: RenderSurface>(
        &self,
        grid: &ModuleGrid,
        options: &CustomizationOptions,
    ) -> Result<(Vec<u8>, ReservedRegion)> {
        let source = options
            .logo
            .as_ref()
            .ok_or_else(|| QrError::Validation("logo pipeline requires a logo".to_string()))?;

        // Geometry comes from the grid the encoder returned, not the requested version.
        let region = ReservedRegion::for_module_count(grid.module_count());
        let mut rendered = CanvasRenderer::new(self.config.surface_size).render::<S>(
            grid,
            Some(&region),
            options.dark_color,
            options.light_color,
        )?;
        debug!(
            module_count = grid.module_count(),
            start = region.row_start,
            end = region.row_end,
            "reserved logo region"
        );

        let image = logo::load_logo(source, self.config.logo_timeout).await?;
        logo::composite(&mut rendered.surface, &rendered.layout, &region, &image, options.light_color);
        Ok((rendered.surface.encode_png()?, region))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        png: Vec<u8>,
        tier: Tier,
        selected: EncodingParameters,
        ecc: QrCodeEcc,
        grid: &ModuleGrid,
        reserved: Option<ReservedRegion>,
        degraded_by: Option<QrError>,
    ) -> Generated {
        debug!(?tier, module_count = grid.module_count(), bytes = png.len(), "generated QR code");
        Generated {
            data_uri: to_data_uri("image/png", &png),
            png,
            tier,
            selected,
            ecc,
            module_count: grid.module_count(),
            reserved,
            degraded_by,
        }
    }
}

fn validate(content: &str, options: &CustomizationOptions) -> Result<()> {
    if content.is_empty() {
        return Err(QrError::Validation("content must not be empty".to_string()));
    }
    options.validate()
}

/// Generates a PNG data-URI with the default engine configuration.
///
/// # Errors
///
/// See [`QrEngine::generate`].
pub async fn generate_data_uri(content: &str, options: &CustomizationOptions) -> Result<String> {
    Ok(QrEngine::default().generate(content, options).await?.data_uri)
}
