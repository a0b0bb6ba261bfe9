//! # qrsynth
//!
//! A Rust library for turning text into QR code images, with an optional logo composited
//! into the center of the symbol without breaking decodability.
//!
//! `qrsynth` picks a QR version and error correction level from the content length and
//! whether a logo is present, encodes the content into a module grid, leaves a centered
//! square of modules unpainted for the logo, rasterizes the rest onto a 1024×1024 surface
//! and draws the logo into the gap with rounded corners. When the logo or the encoding
//! fails, generation degrades step by step (drop the logo and custom colors, then fall
//! back to the lowest error correction level) instead of failing outright.
//!
//! ## Features
//!
//! - Fixed 1024×1024 PNG output, returned as bytes and as a `data:` URI.
//! - Logo compositing from raw image bytes or base64 data-URIs, with a decode timeout.
//! - Explicit fallback chain: full, degraded, minimal.
//! - SVG export with custom colors and margin (no logo).
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrsynth = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Generate a styled QR code:
//!
//! ```rust
//! use qrsynth::config::CustomizationOptions;
//! use qrsynth::engine::QrEngine;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let options = CustomizationOptions::from_hex("#1a237e", "#ffffff", 4, None).unwrap();
//! let code = QrEngine::default()
//!     .generate("https://example.com", &options)
//!     .await
//!     .unwrap();
//! assert!(code.data_uri.starts_with("data:image/png;base64,"));
//! # });
//! ```
//!
//! Generate an SVG string:
//!
//! ```rust
//! use qrsynth::config::CustomizationOptions;
//! use qrsynth::helper::generate_svg_string;
//!
//! let svg = generate_svg_string("Hello, World!", &CustomizationOptions::default()).unwrap();
//! assert!(svg.ends_with("</svg>\n"));
//! ```
//!
//! ## Modules
//!
//! - [`version`]: Version and error correction selection.
//! - [`encoder`]: Module grid encoding.
//! - [`geometry`]: Reserved logo region and pixel layout.
//! - [`surface`]: Drawing surfaces.
//! - [`render`]: Module grid rasterization.
//! - [`logo`]: Logo loading and compositing.
//! - [`engine`]: The generation pipeline and fallback chain.
//! - [`helper`]: Data-URIs, SVG export, previews and saving to disk.

#![forbid(unsafe_code)]

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod helper;
pub mod logo;
pub mod render;
pub mod surface;
pub mod version;

pub use config::{CustomizationOptions, EngineConfig, LogoSource};
pub use engine::{generate_data_uri, Generated, QrEngine, Tier};
pub use error::{LoadFailure, QrError, Result};
