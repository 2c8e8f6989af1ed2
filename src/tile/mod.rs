//! Tile emission layer.
//!
//! This module turns a level raster into encoded tile files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            DeepZoomBuilder              │
//! └────────────────────┬────────────────────┘
//!                      │ level + raster
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileEmitter                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  crop with   │  │  TileEncoder    │  │
//! │  │  clamped     │  │  (JPEG / PNG)   │  │
//! │  │  overlap     │  │                 │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//!        {name}_files/{level}/{col}_{row}.{ext}
//! ```
//!
//! # Components
//!
//! - [`TileEmitter`]: Crops and writes every tile of a level
//! - [`TileEncoder`]: Encodes a tile raster in the pyramid's format
//! - [`TileFormat`]: Output format and its fixed encoding parameters
//! - [`resample`]: Derives a level raster from the source image

mod emitter;
mod encoder;
mod format;

pub use emitter::{level_raster, resample, TileEmitter, RESAMPLE_FILTER};
pub use encoder::{
    clamp_quality, is_valid_quality, TileEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use format::TileFormat;
