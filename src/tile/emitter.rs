//! Tile emitter.
//!
//! Cuts one pyramid level into tiles and writes each one to
//! `{level_dir}/{col}_{row}.{ext}`.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::PyramidError;
use crate::pyramid::PyramidLevel;

use super::encoder::TileEncoder;
use super::format::TileFormat;

/// Resampling filter for every reduced level.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Derive a `width x height` raster from the source image.
///
/// Every level is resampled from the original source, never from another
/// level, so artifacts do not compound down the pyramid.
pub fn resample(source: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    source.resize_exact(width, height, RESAMPLE_FILTER)
}

/// Raster for a level: the source itself at full resolution, a resampled copy
/// otherwise.
pub fn level_raster<'a>(source: &'a DynamicImage, level: &PyramidLevel) -> Cow<'a, DynamicImage> {
    if level.is_full_resolution() {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(resample(source, level.width, level.height))
    }
}

/// Writes the tiles of one level at a time.
#[derive(Debug, Clone, Copy)]
pub struct TileEmitter {
    tile_size: u32,
    overlap: u32,
    encoder: TileEncoder,
}

impl TileEmitter {
    pub fn new(tile_size: u32, overlap: u32, format: TileFormat) -> Self {
        Self {
            tile_size,
            overlap,
            encoder: TileEncoder::new(format),
        }
    }

    pub fn format(&self) -> TileFormat {
        self.encoder.format()
    }

    /// Encode and write every tile of `level` into `level_dir`.
    ///
    /// `raster` must have the level's dimensions. The directory is created if
    /// missing. Returns the number of tiles written.
    ///
    /// # Errors
    ///
    /// - [`PyramidError::Encode`] if the codec rejects a tile
    /// - [`PyramidError::Io`] if the directory or a tile cannot be written
    pub fn emit_level(
        &self,
        level: &PyramidLevel,
        raster: &DynamicImage,
        level_dir: &Path,
    ) -> Result<u64, PyramidError> {
        debug_assert_eq!(raster.dimensions(), (level.width, level.height));

        fs::create_dir_all(level_dir).map_err(|e| PyramidError::io(level_dir, e))?;

        let extension = self.encoder.format().extension();
        let mut written = 0u64;

        for tile in level.tiles(self.tile_size, self.overlap) {
            let region = tile.region;
            if tile.col == 0 && tile.row == 0 {
                debug!(
                    level = level.index,
                    "Tile (0,0) crop area ({}, {}, {}, {})",
                    region.x1,
                    region.y1,
                    region.x2,
                    region.y2
                );
            }

            let cropped = raster.crop_imm(region.x1, region.y1, region.width(), region.height());
            let bytes = self
                .encoder
                .encode(&cropped)
                .map_err(|e| PyramidError::Encode {
                    level: tile.level,
                    col: tile.col,
                    row: tile.row,
                    message: e.to_string(),
                })?;

            let path = level_dir.join(tile.file_name(extension));
            fs::write(&path, &bytes).map_err(|e| PyramidError::io(&path, e))?;
            written += 1;
        }

        Ok(written)
    }
}
