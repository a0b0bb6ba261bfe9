//! End-to-end generation tests through the public API.

use std::io::Cursor;

use image::{ImageBuffer, Rgba, RgbaImage};
use qrsynth::encoder::{MatrixEncoder, ModuleGrid, QrcodeEncoder};
use qrsynth::geometry::{ModuleLayout, ReservedRegion};
use qrsynth::helper::{decode_data_uri, to_data_uri};
use qrsynth::version::{EncodingParameters, QrCodeEcc};
use qrsynth::{CustomizationOptions, Generated, LogoSource, QrEngine, QrError, Tier};

const LOGO_COLOR: Rgba<u8> = Rgba([220, 20, 60, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn logo_png() -> Vec<u8> {
    let img: RgbaImage = ImageBuffer::from_pixel(40, 20, LOGO_COLOR);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode logo");
    buf.into_inner()
}

fn decode(code: &Generated) -> RgbaImage {
    image::load_from_memory(&code.png).expect("decode output").to_rgba8()
}

/// Re-encodes the content the way the engine did, to compare against the output pixels.
fn grid_for(content: &str, code: &Generated) -> ModuleGrid {
    let params = EncodingParameters { version: code.selected.version, ecc: code.ecc };
    let grid = QrcodeEncoder.encode(content, params).expect("re-encode");
    assert_eq!(grid.module_count(), code.module_count);
    grid
}

fn module_center(layout: &ModuleLayout, index: usize) -> u32 {
    let (start, end) = layout.span(index);
    (start + end) / 2
}

// ==========================================================================
// Scenarios
// ==========================================================================

#[tokio::test]
async fn test_short_url_without_logo() {
    let code = QrEngine::default()
        .generate("https://example.com", &CustomizationOptions::default())
        .await
        .expect("generate");

    assert_eq!(code.selected.version.value(), 1);
    assert_eq!(code.selected.ecc, QrCodeEcc::Medium);
    assert_eq!(code.tier, Tier::Full);
    assert!(code.reserved.is_none());
    // 19 bytes do not fit version 1-M; the encoder moved up to version 2.
    assert_eq!(code.module_count, 25);
    assert_eq!(decode(&code).dimensions(), (1024, 1024));
}

#[tokio::test]
async fn test_long_content_without_logo_selects_version_4() {
    let content = "x".repeat(120);
    let code = QrEngine::default()
        .generate(&content, &CustomizationOptions::default())
        .await
        .expect("generate");
    assert_eq!(code.selected.version.value(), 4);
    assert!(code.module_count >= 33);
    assert_eq!(decode(&code).dimensions(), (1024, 1024));
}

#[tokio::test]
async fn test_logo_reserves_center_region() {
    let content = "y".repeat(60);
    let options = CustomizationOptions::default().with_logo(LogoSource::Bytes(logo_png()));
    let code = QrEngine::default().generate(&content, &options).await.expect("generate");

    assert_eq!(code.tier, Tier::Full);
    assert_eq!(code.selected.version.value(), 8);
    assert_eq!(code.selected.ecc, QrCodeEcc::High);
    assert_eq!(code.module_count, 49);
    let region = code.reserved.expect("reserved region");
    assert_eq!((region.row_start, region.row_end), (17, 31));
    assert_eq!((region.col_start, region.col_end), (17, 31));

    let img = decode(&code);
    assert_eq!(img.get_pixel(512, 512), &LOGO_COLOR);
}

#[tokio::test]
async fn test_empty_content_is_validation_error() {
    let err = QrEngine::default()
        .generate("", &CustomizationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, QrError::Validation(_)));
}

#[tokio::test]
async fn test_corrupt_logo_falls_back_to_plain_code() {
    let content = "https://example.com/menu";
    let corrupt = to_data_uri("image/png", b"definitely not a png");
    let options = CustomizationOptions::from_hex("#336699", "#fafafa", 2, Some(LogoSource::DataUri(corrupt)))
        .expect("options");
    let code = QrEngine::default().generate(content, &options).await.expect("generate");

    assert_eq!(code.tier, Tier::Degraded);
    assert!(code.ecc >= QrCodeEcc::Medium);
    assert!(code.reserved.is_none());
    assert!(matches!(code.degraded_by, Some(QrError::Load(_))));

    // Default colors, every module drawn, including the center.
    let grid = grid_for(content, &code);
    let img = decode(&code);
    let layout = ModuleLayout::new(1024, grid.module_count());
    for row in 0..grid.module_count() {
        for col in 0..grid.module_count() {
            let expected = if grid.is_dark(row, col) { BLACK } else { WHITE };
            let pixel = img.get_pixel(module_center(&layout, col), module_center(&layout, row));
            assert_eq!(pixel, &expected, "module ({}, {})", row, col);
        }
    }
}

// ==========================================================================
// Properties
// ==========================================================================

#[tokio::test]
async fn test_output_is_always_1024_square() {
    for len in [1, 25, 26, 50, 51, 100, 101, 400] {
        let content = "q".repeat(len);
        let code = QrEngine::default()
            .generate(&content, &CustomizationOptions::default())
            .await
            .expect("generate");
        assert_eq!(decode(&code).dimensions(), (1024, 1024), "length {}", len);
    }
}

#[tokio::test]
async fn test_modules_outside_reserved_region_match_grid() {
    let content = "https://example.com/products/42";
    let dark = Rgba([10, 40, 90, 255]);
    let light = Rgba([250, 245, 230, 255]);
    let options = CustomizationOptions {
        dark_color: dark,
        light_color: light,
        ..CustomizationOptions::default()
    }
    .with_logo(LogoSource::Bytes(logo_png()));
    let code = QrEngine::default().generate(content, &options).await.expect("generate");
    assert_eq!(code.tier, Tier::Full);

    let grid = grid_for(content, &code);
    let region = ReservedRegion::for_module_count(grid.module_count());
    assert_eq!(code.reserved, Some(region));
    let layout = ModuleLayout::new(1024, grid.module_count());
    let footprint = layout.logo_footprint(&region);
    let img = decode(&code);

    for row in 0..grid.module_count() {
        for col in 0..grid.module_count() {
            let (x, y) = (module_center(&layout, col), module_center(&layout, row));
            let pixel = *img.get_pixel(x, y);
            if region.contains(row, col) {
                assert_ne!(pixel, dark, "dark module painted inside reserved ({}, {})", row, col);
                continue;
            }
            // The logo footprint is centered on the surface and may overlap the
            // ring of modules around an odd-offset region by half a module.
            let fx = f64::from(x) + 0.5;
            let fy = f64::from(y) + 0.5;
            if fx >= footprint.x && fx < footprint.x + footprint.size && fy >= footprint.y && fy < footprint.y + footprint.size {
                continue;
            }
            let expected = if grid.is_dark(row, col) { dark } else { light };
            assert_eq!(pixel, expected, "module ({}, {})", row, col);
        }
    }
}

#[tokio::test]
async fn test_data_uri_carries_png() {
    let code = QrEngine::default()
        .generate("payload", &CustomizationOptions::default())
        .await
        .expect("generate");
    let bytes = decode_data_uri(&code.data_uri).expect("data uri");
    assert_eq!(bytes, code.png);
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_oversized_content_fails_after_all_tiers() {
    let content = "z".repeat(5000);
    let err = QrEngine::default()
        .generate(&content, &CustomizationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, QrError::Encoding(_)));
}

#[tokio::test]
async fn test_concurrent_generations_are_independent() {
    let engine = QrEngine::default();
    let plain = CustomizationOptions::default();
    let with_logo = CustomizationOptions::default().with_logo(LogoSource::Bytes(logo_png()));
    let (a, b) = tokio::join!(
        engine.generate("first", &plain),
        engine.generate("second", &with_logo),
    );
    let (a, b) = (a.expect("first"), b.expect("second"));
    assert!(a.reserved.is_none());
    assert!(b.reserved.is_some());
    assert_ne!(decode(&a).get_pixel(512, 512), &LOGO_COLOR);
    assert_eq!(decode(&b).get_pixel(512, 512), &LOGO_COLOR);
}
