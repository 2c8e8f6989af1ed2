//! Tile output formats.

use std::fmt;
use std::str::FromStr;

use super::encoder::{clamp_quality, DEFAULT_JPEG_QUALITY};

/// Encoding used for every tile of a pyramid.
///
/// Encoding parameters are fixed per pyramid, never per tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    /// Lossy JPEG at the given quality (1-100)
    Jpeg { quality: u8 },

    /// Lossless PNG
    Png,
}

impl TileFormat {
    /// JPEG at the given quality, clamped to 1-100.
    pub fn jpeg(quality: u8) -> Self {
        TileFormat::Jpeg {
            quality: clamp_quality(quality),
        }
    }

    /// Resolve a format name (`jpg`, `jpeg`, `png`), case-insensitive.
    ///
    /// `quality` only applies to lossy formats.
    pub fn from_name(name: &str, quality: u8) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::jpeg(quality)),
            "png" => Some(TileFormat::Png),
            _ => None,
        }
    }

    /// File extension of tiles, also used as the descriptor's `Format`.
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Jpeg { .. } => "jpg",
            TileFormat::Png => "png",
        }
    }

    /// MIME type for uploaded tiles.
    pub fn content_type(&self) -> &'static str {
        match self {
            TileFormat::Jpeg { .. } => "image/jpeg",
            TileFormat::Png => "image/png",
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, TileFormat::Png)
    }
}

impl Default for TileFormat {
    fn default() -> Self {
        TileFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileFormat::Jpeg { quality } => write!(f, "jpg (quality {})", quality),
            TileFormat::Png => f.write_str("png"),
        }
    }
}

impl FromStr for TileFormat {
    type Err = String;

    /// Parses a bare format name at the default quality.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileFormat::from_name(s, DEFAULT_JPEG_QUALITY)
            .ok_or_else(|| format!("unsupported tile format {:?} (expected jpg or png)", s))
    }
}
