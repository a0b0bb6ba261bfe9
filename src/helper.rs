use crate::config::{to_hex, CustomizationOptions};
use crate::encoder::{MatrixEncoder, ModuleGrid, QrcodeEncoder};
use crate::error::{LoadFailure, Result};
use crate::version::QrCodeEcc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Utilities ----*/

/// Encodes bytes as a base64 data-URI with the given MIME type.
///
/// # Example
///
/// ```
/// use qrsynth::helper::to_data_uri;
///
/// assert_eq!(to_data_uri("image/png", b"hi"), "data:image/png;base64,aGk=");
/// ```
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
	format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Decodes the payload of a base64 data-URI such as `data:image/png;base64,iVBOR...`.
///
/// # Errors
///
/// Returns [`LoadFailure::DecodeFailure`] if the string is not a base64 data-URI.
pub fn decode_data_uri(uri: &str) -> std::result::Result<Vec<u8>, LoadFailure> {
	let rest = uri
		.strip_prefix("data:")
		.ok_or_else(|| LoadFailure::DecodeFailure("not a data URI".to_string()))?;
	let (metadata, payload) = rest
		.split_once(',')
		.ok_or_else(|| LoadFailure::DecodeFailure("invalid data URI: missing comma".to_string()))?;
	if !metadata.ends_with(";base64") {
		return Err(LoadFailure::DecodeFailure("only base64 data URIs are supported".to_string()));
	}
	BASE64
		.decode(payload.trim())
		.map_err(|e| LoadFailure::DecodeFailure(format!("failed to decode base64: {}", e)))
}

// Returns a string of SVG code for an image depicting
// the given module grid, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(grid: &ModuleGrid, options: &CustomizationOptions) -> String {
	let border = options.margin as usize;
	let mut result = String::new();
	result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
	result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
	let dimension = grid.module_count() + border * 2;
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n", dimension);
	result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", to_hex(options.light_color));
	result += "\t<path d=\"";
	let mut first = true;
	for y in 0 .. grid.module_count() {
		for x in 0 .. grid.module_count() {
			if grid.is_dark(y, x) {
				if !first {
					result += " ";
				}
				first = false;
				result += &format!("M{},{}h1v1h-1z", x + border, y + border);
			}
		}
	}
	result += &format!("\" fill=\"{}\"/>\n", to_hex(options.dark_color));
	result += "</svg>\n";
	result
}

/// Generates a QR Code SVG from the provided content.
///
/// This path goes straight to the encoder with the colors and margin from
/// `options`; it never draws a logo, even if `options.logo` is set.
///
/// # Errors
///
/// Returns [`crate::QrError::Encoding`] if the content is too long for version 40.
///
/// # Example
///
/// ```
/// use qrsynth::config::CustomizationOptions;
/// use qrsynth::helper::generate_svg_string;
///
/// let svg = generate_svg_string("Hello, World!", &CustomizationOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn generate_svg_string(content: &str, options: &CustomizationOptions) -> Result<String> {
	options.validate()?;
	let grid = QrcodeEncoder.encode_auto(content, QrCodeEcc::Medium)?;
	Ok(to_svg_string(&grid, options))
}

/// Renders the grid as text, two characters per module, with a quiet zone of `border` modules.
pub fn to_text_preview(grid: &ModuleGrid, border: usize) -> String {
	let side = grid.module_count() + border * 2;
	let mut result = String::with_capacity(side * (side * 2 + 1) * 3);
	for y in 0 .. side {
		for x in 0 .. side {
			let dark = y >= border && x >= border && grid.is_dark(y - border, x - border);
			let c: char = if dark { '█' } else { ' ' };
			result.push(c);
			result.push(c);
		}
		result.push('\n');
	}
	result
}

/// Prints the given module grid to the console.
pub fn print_qr(grid: &ModuleGrid) {
	println!("{}", to_text_preview(grid, 4));
}

/// Writes PNG bytes to a file and returns its path.
///
/// # Arguments
///
/// * `png` - The encoded PNG image.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
///
/// # Errors
///
/// Returns an `std::io::Error` if the directory cannot be created or the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use qrsynth::helper::save_png;
///
/// # let png: Vec<u8> = Vec::new();
/// let path = save_png(&png, Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn save_png(png: &[u8], directory_path: Option<&str>, filename: Option<&str>) -> std::io::Result<PathBuf> {
	let directory_path = directory_path.unwrap_or("generated");
	let filename = match filename {
		Some(name) => name.to_string(),
		None => {
			let since_the_epoch = SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.unwrap_or_default();
			format!("{}", since_the_epoch.as_millis())
		},
	};

	// Check if the directory exists, create it if it doesn't
	if !Path::new(directory_path).exists() {
		fs::create_dir_all(directory_path)?;
	}

	let file_path = Path::new(directory_path).join(format!("{}.png", filename));
	fs::write(&file_path, png)?;
	Ok(file_path)
}
