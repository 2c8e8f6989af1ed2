//! Tile encoder.
//!
//! Turns a cropped tile raster into encoded bytes for the pyramid's format.
//!
//! # Design Decisions
//!
//! - **Fixed parameters**: the format and quality are chosen once per pyramid;
//!   the encoder holds them and applies them to every tile.
//!
//! - **Sample layout**: JPEG has no alpha channel and only 8-bit samples, so
//!   tiles are flattened to 8-bit RGB (or 8-bit luma for grayscale sources)
//!   before encoding. PNG keeps the native layout except for float rasters,
//!   which are converted to 8-bit RGBA.

use std::borrow::Cow;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageResult};

use super::format::TileFormat;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Tile Encoder
// =============================================================================

/// Encoder applying one pyramid's output format to each tile.
///
/// # Example
///
/// ```ignore
/// use dzi_tiler::tile::{TileEncoder, TileFormat};
///
/// let encoder = TileEncoder::new(TileFormat::jpeg(85));
/// let bytes = encoder.encode(&tile_raster)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TileEncoder {
    format: TileFormat,
}

impl TileEncoder {
    /// Create an encoder for the given format.
    pub fn new(format: TileFormat) -> Self {
        Self { format }
    }

    /// The format this encoder produces.
    pub fn format(&self) -> TileFormat {
        self.format
    }

    /// Encode a tile raster.
    ///
    /// # Errors
    ///
    /// Returns the codec's error if it rejects the raster.
    pub fn encode(&self, tile: &DynamicImage) -> ImageResult<Bytes> {
        let mut output = Vec::new();

        match self.format {
            TileFormat::Jpeg { quality } => {
                let quality = clamp_quality(quality);
                let prepared = prepare_for_jpeg(tile);
                let encoder = JpegEncoder::new_with_quality(&mut output, quality);
                prepared.write_with_encoder(encoder)?;
            }
            TileFormat::Png => {
                let prepared = prepare_for_png(tile);
                let encoder = PngEncoder::new(&mut output);
                prepared.write_with_encoder(encoder)?;
            }
        }

        Ok(Bytes::from(output))
    }
}

/// Flatten to a sample layout the JPEG codec accepts.
fn prepare_for_jpeg(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn prepare_for_png(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Borrowed(image),
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
