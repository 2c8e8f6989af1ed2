//! Deep Zoom pyramid builder.
//!
//! Orchestrates a full build:
//!
//! ```text
//!  decode source ─▶ plan levels ─▶ for level in 0..=max_level:
//!                                     raster = source | resample(source)
//!                                     emit tiles
//!                                  ─▶ write descriptor
//! ```
//!
//! Levels are processed one at a time in increasing order and each level's
//! raster is dropped as soon as its tiles are written. The descriptor is
//! written last: a directory without a `.dzi` file is an incomplete pyramid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageReader};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PyramidConfig;
use crate::dzi::{DziDescriptor, PyramidLayout};
use crate::error::PyramidError;
use crate::tile::{level_raster, TileEmitter};

use super::planner::PyramidPlan;

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PyramidSummary {
    /// Path of the written descriptor
    pub dzi_path: PathBuf,

    /// Directory holding the level directories
    pub tiles_dir: PathBuf,

    pub width: u32,
    pub height: u32,
    pub max_level: u32,

    /// Number of levels, `max_level + 1`
    pub levels: usize,

    /// Total tiles written across all levels
    pub tiles_written: u64,
}

/// Builds Deep Zoom pyramids with a fixed configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use dzi_tiler::{DeepZoomBuilder, PyramidConfig};
///
/// let builder = DeepZoomBuilder::new(PyramidConfig::default());
/// let summary = builder
///     .create_dzi(Path::new("input/sample1.jpg"), Path::new("out/sample1.dzi"))
///     .unwrap();
/// println!("{} tiles", summary.tiles_written);
/// ```
#[derive(Debug, Clone)]
pub struct DeepZoomBuilder {
    config: PyramidConfig,
}

impl DeepZoomBuilder {
    pub fn new(config: PyramidConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PyramidConfig {
        &self.config
    }

    /// Decode `source_path` and build its pyramid next to `dzi_path`.
    ///
    /// Tiles go to `{dir}/{name}_files/` where `dir` and `name` come from
    /// `dzi_path`.
    pub fn create_dzi(
        &self,
        source_path: &Path,
        dzi_path: &Path,
    ) -> Result<PyramidSummary, PyramidError> {
        // Bad configuration must fail before the (potentially slow) decode
        self.config.validate()?;

        info!("Creating DZI from {}", source_path.display());
        let source = load_source(source_path)?;

        self.create_dzi_from_image(&source, dzi_path)
    }

    /// Build the pyramid of an already decoded image.
    pub fn create_dzi_from_image(
        &self,
        source: &DynamicImage,
        dzi_path: &Path,
    ) -> Result<PyramidSummary, PyramidError> {
        self.config.validate()?;

        let (width, height) = source.dimensions();
        let plan = PyramidPlan::new(width, height, self.config.tile_size, self.config.overlap)?;
        let layout = PyramidLayout::from_dzi_path(dzi_path)?;

        info!("Source image: {}x{}", width, height);
        info!("Creating pyramid with max level {}...", plan.max_level);

        remove_stale_descriptor(dzi_path)?;

        let tiles_dir = layout.tiles_dir();
        fs::create_dir_all(&tiles_dir).map_err(|e| PyramidError::io(&tiles_dir, e))?;

        let started = Instant::now();
        let emitter = TileEmitter::new(self.config.tile_size, self.config.overlap, self.config.format);
        let mut tiles_written = 0u64;

        for level in &plan.levels {
            info!(
                "Level {}: {}x{} (scale: 1/{})",
                level.index, level.width, level.height, level.scale_factor
            );

            let raster = level_raster(source, level);
            tiles_written += emitter.emit_level(level, &raster, &layout.level_dir(level.index))?;
        }

        let descriptor = DziDescriptor::new(
            self.config.format.extension(),
            self.config.overlap,
            self.config.tile_size,
            width,
            height,
        );
        write_descriptor(&descriptor, dzi_path)?;

        info!(
            "DZI creation complete: {} ({} tiles in {:.2?})",
            dzi_path.display(),
            tiles_written,
            started.elapsed()
        );

        Ok(PyramidSummary {
            dzi_path: dzi_path.to_path_buf(),
            tiles_dir,
            width,
            height,
            max_level: plan.max_level,
            levels: plan.level_count(),
            tiles_written,
        })
    }
}

/// Open and decode the source image, guessing the format from its content.
pub fn load_source(path: &Path) -> Result<DynamicImage, PyramidError> {
    let decode_error = |message: String| PyramidError::Decode {
        path: path.display().to_string(),
        message,
    };

    ImageReader::open(path)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}

/// A descriptor left by an earlier run would vouch for tiles this run may
/// fail to produce.
fn remove_stale_descriptor(dzi_path: &Path) -> Result<(), PyramidError> {
    match fs::remove_file(dzi_path) {
        Ok(()) => {
            debug!("Removed stale descriptor {}", dzi_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PyramidError::io(dzi_path, e)),
    }
}

/// Write to a sibling temp file and rename, so a crash never leaves a
/// truncated descriptor behind.
fn write_descriptor(descriptor: &DziDescriptor, dzi_path: &Path) -> Result<(), PyramidError> {
    let mut partial = dzi_path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let result = descriptor
        .write_to(&partial)
        .and_then(|()| fs::rename(&partial, dzi_path).map_err(|e| PyramidError::io(dzi_path, e)));

    if result.is_err() {
        // Never leave a half-finished descriptor for publish to pick up
        if let Err(e) = fs::remove_file(&partial) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!("Could not remove {}: {}", partial.display(), e);
            }
        }
    }
    result
}
