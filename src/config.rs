//! Configuration management for DZI Tiler.
//!
//! Two layers:
//! - [`PyramidConfig`]: the immutable tiling parameters handed to the builder
//! - [`Cli`]: command-line arguments (clap), with `DZI_` environment variable
//!   fallbacks and sensible defaults
//!
//! # Environment Variables
//!
//! - `DZI_TILE_SIZE` - Tile size in pixels (default: 254)
//! - `DZI_OVERLAP` - Tile overlap in pixels (default: 1)
//! - `DZI_FORMAT` - Tile format, `jpg` or `png` (default: jpg)
//! - `DZI_QUALITY` - JPEG quality (default: 85)
//! - `DZI_S3_BUCKET` - Destination bucket for `publish` (default: images)
//! - `DZI_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services (MinIO)
//! - `DZI_S3_REGION` - AWS region (default: us-east-1)
//! - `DZI_S3_PREFIX` - Key prefix for uploaded objects
//!
//! S3 credentials come from the standard AWS provider chain
//! (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, profiles, ...).

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::PyramidError;
use crate::tile::{is_valid_quality, TileFormat, DEFAULT_JPEG_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default tile size in pixels. With the default overlap a full interior tile
/// is 256 pixels wide.
pub const DEFAULT_TILE_SIZE: u32 = 254;

/// Default tile overlap in pixels.
pub const DEFAULT_OVERLAP: u32 = 1;

/// Default tile format name.
pub const DEFAULT_FORMAT: &str = "jpg";

/// Default destination bucket.
pub const DEFAULT_BUCKET: &str = "images";

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// Pyramid Configuration
// =============================================================================

/// Tiling parameters of one pyramid.
///
/// Fixed for the whole build and passed explicitly to the builder; the
/// algorithm itself holds no defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidConfig {
    /// Tile size in pixels, excluding overlap
    pub tile_size: u32,

    /// Extra pixels on each side of a tile
    pub overlap: u32,

    /// Output format and its encoding parameters
    pub format: TileFormat,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_OVERLAP,
            format: TileFormat::default(),
        }
    }
}

impl PyramidConfig {
    pub fn validate(&self) -> Result<(), PyramidError> {
        if self.tile_size == 0 {
            return Err(PyramidError::InvalidTileSize(self.tile_size));
        }
        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// DZI Tiler - Deep Zoom pyramid generator.
///
/// Cuts a single image into a multi-resolution tile pyramid readable by
/// Deep Zoom viewers such as OpenSeadragon.
#[derive(Parser, Debug, Clone)]
#[command(name = "dzi-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a pyramid into a local directory.
    Generate(GenerateConfig),

    /// Generate a pyramid in a temporary directory and upload it to S3.
    Publish(PublishConfig),

    /// Check that every tile of a generated pyramid is present.
    Verify(VerifyConfig),
}

/// Tiling flags shared by `generate` and `publish`.
#[derive(Args, Debug, Clone)]
pub struct TilingArgs {
    /// Tile size in pixels (excluding overlap).
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "DZI_TILE_SIZE")]
    pub tile_size: u32,

    /// Tile overlap in pixels.
    #[arg(long, default_value_t = DEFAULT_OVERLAP, env = "DZI_OVERLAP")]
    pub overlap: u32,

    /// Tile format.
    #[arg(long, default_value = DEFAULT_FORMAT, value_parser = ["jpg", "jpeg", "png"], ignore_case = true, env = "DZI_FORMAT")]
    pub format: String,

    /// JPEG quality (1-100). Ignored for lossless formats.
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "DZI_QUALITY")]
    pub quality: u8,
}

impl TilingArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }
        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }
        if TileFormat::from_name(&self.format, self.quality).is_none() {
            return Err(format!("unsupported format: {}", self.format));
        }
        Ok(())
    }

    /// Build the pyramid configuration (call validate() first).
    pub fn pyramid_config(&self) -> PyramidConfig {
        PyramidConfig {
            tile_size: self.tile_size,
            overlap: self.overlap,
            format: TileFormat::from_name(&self.format, self.quality).unwrap_or_default(),
        }
    }
}

/// Arguments of `generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateConfig {
    /// Source image.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory; receives `{name}.dzi` and `{name}_files/`.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Base name of the pyramid (default: input file stem).
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Print the build summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl GenerateConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tiling.validate()?;
        resolve_name(self.name.as_deref(), &self.input).map(|_| ())
    }

    /// Path of the descriptor to write.
    pub fn dzi_path(&self) -> Result<PathBuf, String> {
        let name = resolve_name(self.name.as_deref(), &self.input)?;
        Ok(self.output.join(format!("{}.dzi", name)))
    }
}

/// Arguments of `publish`.
#[derive(Args, Debug, Clone)]
pub struct PublishConfig {
    /// Source image.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Base name of the pyramid (default: input file stem).
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Destination bucket.
    #[arg(long, default_value = DEFAULT_BUCKET, env = "DZI_S3_BUCKET")]
    pub s3_bucket: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "DZI_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "DZI_S3_REGION")]
    pub s3_region: String,

    /// Key prefix prepended to every uploaded object (e.g. "pyramids/").
    #[arg(long, env = "DZI_S3_PREFIX")]
    pub s3_prefix: Option<String>,

    /// Create the bucket if it does not exist.
    #[arg(long, default_value_t = false)]
    pub create_bucket: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl PublishConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tiling.validate()?;
        if self.s3_bucket.is_empty() {
            return Err(
                "S3 bucket name is required. Set --s3-bucket or DZI_S3_BUCKET".to_string(),
            );
        }
        resolve_name(self.name.as_deref(), &self.input).map(|_| ())
    }

    pub fn pyramid_name(&self) -> Result<String, String> {
        resolve_name(self.name.as_deref(), &self.input)
    }

    /// Key prefix normalized to either empty or ending with exactly one `/`.
    pub fn key_prefix(&self) -> String {
        match self.s3_prefix.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{}/", prefix),
            _ => String::new(),
        }
    }
}

/// Arguments of `verify`.
#[derive(Args, Debug, Clone)]
pub struct VerifyConfig {
    /// Descriptor of the pyramid to check.
    #[arg(long)]
    pub dzi: PathBuf,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Explicit name, or the input's file stem.
fn resolve_name(name: Option<&str>, input: &Path) -> Result<String, String> {
    let name = match name {
        Some(name) => name.to_string(),
        None => input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| format!("cannot derive a name from {}", input.display()))?,
    };

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(format!("invalid pyramid name: {:?}", name));
    }
    Ok(name)
}

// =============================================================================
// Tests
// =============================================================================
