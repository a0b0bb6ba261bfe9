//! Logo loading and compositing.
//!
//! Decoding runs on the blocking pool and is bounded by a timeout; a logo that
//! fails to decode or takes too long surfaces as [`LoadFailure`] so the engine
//! can drop it and fall back to a plain code.

use std::future::Future;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::config::LogoSource;
use crate::error::LoadFailure;
use crate::geometry::{LogoFootprint, ModuleLayout, ReservedRegion};
use crate::helper::decode_data_uri;
use crate::surface::RenderSurface;

/// Decodes `source` into RGBA pixels, giving up after `limit`.
///
/// # Errors
///
/// Returns [`LoadFailure::DecodeFailure`] for unreadable data and
/// [`LoadFailure::Timeout`] when decoding outlives `limit`.
pub async fn load_logo(source: &LogoSource, limit: Duration) -> Result<RgbaImage, LoadFailure> {
    let source = source.clone();
    let decode = async move {
        tokio::task::spawn_blocking(move || decode_logo(&source))
            .await
            .map_err(|e| LoadFailure::DecodeFailure(format!("decoder task failed: {}", e)))?
    };
    with_timeout(limit, decode).await
}

/// Runs `fut`, mapping expiry of `limit` to [`LoadFailure::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, LoadFailure>
where
    F: Future<Output = Result<T, LoadFailure>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| LoadFailure::Timeout(limit))?
}

/// Synchronously decodes raw bytes or a base64 data-URI.
pub fn decode_logo(source: &LogoSource) -> Result<RgbaImage, LoadFailure> {
    let decoded;
    let bytes: &[u8] = match source {
        LogoSource::Bytes(bytes) => bytes,
        LogoSource::DataUri(uri) => {
            decoded = decode_data_uri(uri)?;
            &decoded
        }
    };
    let img = image::load_from_memory(bytes)
        .map_err(|e| LoadFailure::DecodeFailure(format!("failed to decode logo: {}", e)))?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(LoadFailure::DecodeFailure("logo has no pixels".to_string()));
    }
    Ok(rgba)
}

/// Paints the logo into the reserved area of an already rendered grid.
///
/// A rounded square of `light` is painted over the footprint first, then the
/// logo is stretched to the same square and drawn inside the rounded clip.
pub fn composite<S: RenderSurface>(
    surface: &mut S,
    layout: &ModuleLayout,
    region: &ReservedRegion,
    logo: &RgbaImage,
    light: Rgba<u8>,
) -> LogoFootprint {
    let footprint = layout.logo_footprint(region);
    surface.fill_rounded(&footprint, light);
    surface.draw_clipped_image(logo, &footprint);
    debug!(
        x = footprint.x,
        size = footprint.size,
        radius = footprint.radius,
        logo_width = logo.width(),
        logo_height = logo.height(),
        "composited logo"
    );
    footprint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::to_data_uri;
    use crate::surface::RasterSurface;
    use image::ImageBuffer;
    use std::io::Cursor;

    fn png_bytes(color: Rgba<u8>) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_pixel(8, 4, color);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_bytes_and_data_uri() {
        let png = png_bytes(Rgba([1, 2, 3, 255]));
        let from_bytes = decode_logo(&LogoSource::Bytes(png.clone())).unwrap();
        assert_eq!(from_bytes.dimensions(), (8, 4));

        let uri = to_data_uri("image/png", &png);
        let from_uri = decode_logo(&LogoSource::DataUri(uri)).unwrap();
        assert_eq!(from_uri, from_bytes);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_logo(&LogoSource::Bytes(b"not an image".to_vec())).unwrap_err();
        assert!(matches!(err, LoadFailure::DecodeFailure(_)));
        let err = decode_logo(&LogoSource::DataUri("data:image/png;base64,!!!".into())).unwrap_err();
        assert!(matches!(err, LoadFailure::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn test_load_logo_async() {
        let png = png_bytes(Rgba([9, 9, 9, 255]));
        let logo = load_logo(&LogoSource::Bytes(png), Duration::from_secs(5)).await.unwrap();
        assert_eq!(logo.get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_load_failure() {
        let limit = Duration::from_millis(10);
        let never = std::future::pending::<Result<(), LoadFailure>>();
        let err = with_timeout(limit, never).await.unwrap_err();
        assert_eq!(err, LoadFailure::Timeout(limit));
    }

    #[test]
    fn test_composite_fills_footprint() {
        let green = Rgba([0, 200, 0, 255]);
        let white = Rgba([255, 255, 255, 255]);
        let mut surface = RasterSurface::allocate(1024, 1024, Rgba([0, 0, 0, 255])).unwrap();
        let layout = ModuleLayout::new(1024, 49);
        let region = ReservedRegion::for_module_count(49);
        let logo = ImageBuffer::from_pixel(3, 5, green);

        let footprint = composite(&mut surface, &layout, &region, &logo, white);
        assert_eq!(surface.get_pixel(512, 512), green);
        // Corner of the footprint is outside the rounded clip and keeps the module color.
        let corner = footprint.x.floor() as u32;
        assert_eq!(surface.get_pixel(corner, corner), Rgba([0, 0, 0, 255]));
        // Just outside the footprint nothing changes.
        let outside = (footprint.x + footprint.size).ceil() as u32 + 1;
        assert_eq!(surface.get_pixel(outside, 512), Rgba([0, 0, 0, 255]));
    }
}
