//! # DZI Tiler
//!
//! Converts a single raster image into a Deep Zoom Image (DZI) tile pyramid
//! so that viewers such as OpenSeadragon can fetch only the tiles needed for
//! the current viewport and zoom level.
//!
//! ## Features
//!
//! - **Deterministic planning**: Level and tile geometry is pure integer math
//! - **Per-level fidelity**: Every level is resampled (Lanczos3) straight from the source
//! - **Clamped overlap**: Edge tiles carry no overlap beyond the raster bounds
//! - **Safe completion**: The `.dzi` descriptor is written only after every tile
//! - **Publishing**: Uploads a finished pyramid to S3-compatible storage (MinIO, etc.)
//!
//! ## Architecture
//!
//! - [`pyramid`] - Planner (geometry) and builder (orchestration)
//! - [`tile`] - Tile emitter and encoder
//! - [`dzi`] - Descriptor document, output layout, verification
//! - [`io`] - Object store abstraction and directory upload
//! - [`config`] - Pyramid configuration and CLI types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dzi_tiler::{DeepZoomBuilder, PyramidConfig, TileFormat};
//!
//! let config = PyramidConfig {
//!     tile_size: 254,
//!     overlap: 1,
//!     format: TileFormat::jpeg(85),
//! };
//!
//! let summary = DeepZoomBuilder::new(config)
//!     .create_dzi(Path::new("sample1.jpg"), Path::new("out/sample1.dzi"))
//!     .expect("pyramid generation failed");
//!
//! println!("max level {}, {} tiles", summary.max_level, summary.tiles_written);
//! ```

pub mod config;
pub mod dzi;
pub mod error;
pub mod io;
pub mod pyramid;
pub mod tile;

// Re-export commonly used types
pub use config::{
    Cli, Command, GenerateConfig, PublishConfig, PyramidConfig, TilingArgs, VerifyConfig,
    DEFAULT_OVERLAP, DEFAULT_TILE_SIZE,
};
pub use dzi::{verify_pyramid, DziDescriptor, PyramidLayout, VerifyReport, DZI_NAMESPACE};
pub use error::{DescriptorError, PyramidError, UploadError};
pub use io::{
    collect_upload_entries, create_s3_client, object_key, upload_directory, ObjectStore,
    S3ObjectStore, UploadEntry, UploadSummary,
};
pub use pyramid::{
    calculate_max_level, level_dimensions, load_source, CropRect, DeepZoomBuilder, PyramidLevel,
    PyramidPlan, PyramidSummary, TileSpec,
};
pub use tile::{resample, TileEmitter, TileEncoder, TileFormat, DEFAULT_JPEG_QUALITY};
