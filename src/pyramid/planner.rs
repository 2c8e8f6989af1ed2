//! Pyramid level and tile geometry.
//!
//! Deep Zoom numbers levels from the coarsest upwards:
//! - level 0 = 1x1 pixel (or close to it)
//! - level `max_level` = full source resolution
//!
//! Everything here is pure integer arithmetic over the source dimensions and
//! the tiling parameters. No image data is touched, which keeps the planner
//! testable without a codec or a filesystem.

use crate::error::PyramidError;

// =============================================================================
// Level Math
// =============================================================================

/// Calculate the maximum DZI level for given image dimensions.
///
/// max_level = ceil(log2(max(width, height))), with a 1x1 image mapping to 0.
pub fn calculate_max_level(width: u32, height: u32) -> u32 {
    let max_dim = width.max(height);
    if max_dim <= 1 {
        return 0;
    }
    // ceil(log2(n)) for n >= 2 is the bit length of n - 1
    u32::BITS - (max_dim - 1).leading_zeros()
}

/// Downsample factor of a level relative to the source, 2^(max_level - level).
///
/// Returns `None` for levels beyond `max_level`.
pub fn level_scale_factor(level: u32, max_level: u32) -> Option<u64> {
    max_level
        .checked_sub(level)
        .and_then(|shift| 1u64.checked_shl(shift))
}

/// Calculate dimensions at a specific DZI level.
///
/// At level L the dimensions are floor(source / 2^(max_level - L)), never
/// smaller than 1 pixel. Returns `(0, 0)` for levels beyond `max_level`.
pub fn level_dimensions(width: u32, height: u32, level: u32, max_level: u32) -> (u32, u32) {
    let Some(scale) = level_scale_factor(level, max_level) else {
        return (0, 0);
    };
    let level_width = (u64::from(width) / scale) as u32;
    let level_height = (u64::from(height) / scale) as u32;

    (level_width.max(1), level_height.max(1))
}

/// Calculate the tile grid `(cols, rows)` for a level.
pub fn tile_grid(level_width: u32, level_height: u32, tile_size: u32) -> (u32, u32) {
    (
        level_width.div_ceil(tile_size),
        level_height.div_ceil(tile_size),
    )
}

// =============================================================================
// Crop Rectangles
// =============================================================================

/// A half-open pixel rectangle `[x1, x2) x [y1, y2)` within a level raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropRect {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Number of pixels covered by this rectangle.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Whether the rectangle lies inside a `width x height` raster.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2 && self.x2 <= width && self.y2 <= height
    }
}

// =============================================================================
// Tile Spec
// =============================================================================

/// One tile of one level: its grid position and the pixels it is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    /// Level index the tile belongs to
    pub level: u32,

    /// Column in the level's tile grid
    pub col: u32,

    /// Row in the level's tile grid
    pub row: u32,

    /// Crop rectangle including the clamped overlap margin
    pub region: CropRect,

    /// Exclusive region of the tile, without overlap
    pub core: CropRect,
}

impl TileSpec {
    /// File name of the tile, `{col}_{row}.{extension}`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_{}.{}", self.col, self.row, extension)
    }
}

// =============================================================================
// PyramidLevel
// =============================================================================

/// A single level of the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidLevel {
    /// Level index (0 = smallest, `max_level` = full resolution)
    pub index: u32,

    /// Level width in pixels
    pub width: u32,

    /// Level height in pixels
    pub height: u32,

    /// Downsample factor relative to the source (power of two)
    pub scale_factor: u64,

    /// Number of tile columns
    pub cols: u32,

    /// Number of tile rows
    pub rows: u32,
}

impl PyramidLevel {
    /// Total number of tiles in this level.
    pub fn tile_count(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }

    /// Whether this level is the untouched source resolution.
    pub fn is_full_resolution(&self) -> bool {
        self.scale_factor == 1
    }

    /// Geometry of the tile at `(col, row)`.
    ///
    /// The crop rectangle is the tile's exclusive region grown by `overlap` on
    /// every side and clamped to the level bounds, so edge tiles carry no
    /// overlap on the sides that touch the raster boundary.
    pub fn tile(&self, col: u32, row: u32, tile_size: u32, overlap: u32) -> TileSpec {
        let x = col * tile_size;
        let y = row * tile_size;

        let region = CropRect::new(
            x.saturating_sub(overlap),
            y.saturating_sub(overlap),
            self.width.min(x.saturating_add(tile_size).saturating_add(overlap)),
            self.height.min(y.saturating_add(tile_size).saturating_add(overlap)),
        );
        let core = CropRect::new(
            x,
            y,
            self.width.min(x.saturating_add(tile_size)),
            self.height.min(y.saturating_add(tile_size)),
        );

        TileSpec {
            level: self.index,
            col,
            row,
            region,
            core,
        }
    }

    /// All tiles of the level in row-major order (rows outer, columns inner).
    pub fn tiles(&self, tile_size: u32, overlap: u32) -> impl Iterator<Item = TileSpec> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| self.tile(col, row, tile_size, overlap))
        })
    }
}

// =============================================================================
// PyramidPlan
// =============================================================================

/// Complete geometry of a Deep Zoom pyramid for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidPlan {
    pub source_width: u32,
    pub source_height: u32,
    pub tile_size: u32,
    pub overlap: u32,
    pub max_level: u32,

    /// Levels ordered by index, `levels[i].index == i`
    pub levels: Vec<PyramidLevel>,
}

impl PyramidPlan {
    /// Plan the pyramid for a `width x height` source.
    ///
    /// # Errors
    ///
    /// - [`PyramidError::InvalidTileSize`] if `tile_size` is 0
    /// - [`PyramidError::InvalidDimension`] if either dimension is 0
    pub fn new(width: u32, height: u32, tile_size: u32, overlap: u32) -> Result<Self, PyramidError> {
        if tile_size == 0 {
            return Err(PyramidError::InvalidTileSize(tile_size));
        }
        if width == 0 || height == 0 {
            return Err(PyramidError::InvalidDimension { width, height });
        }

        let max_level = calculate_max_level(width, height);
        let levels = (0..=max_level)
            .filter_map(|index| {
                let scale_factor = level_scale_factor(index, max_level)?;
                let (level_width, level_height) = level_dimensions(width, height, index, max_level);
                let (cols, rows) = tile_grid(level_width, level_height, tile_size);
                Some(PyramidLevel {
                    index,
                    width: level_width,
                    height: level_height,
                    scale_factor,
                    cols,
                    rows,
                })
            })
            .collect();

        Ok(Self {
            source_width: width,
            source_height: height,
            tile_size,
            overlap,
            max_level,
            levels,
        })
    }

    /// Look up a level by index.
    pub fn level(&self, index: u32) -> Option<&PyramidLevel> {
        self.levels.get(index as usize)
    }

    /// Number of levels, `max_level + 1`.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Total number of tiles across every level.
    pub fn total_tiles(&self) -> u64 {
        self.levels.iter().map(PyramidLevel::tile_count).sum()
    }

    /// Tiles of a level using this plan's tile size and overlap.
    pub fn tiles_for<'a>(&self, level: &'a PyramidLevel) -> impl Iterator<Item = TileSpec> + 'a {
        level.tiles(self.tile_size, self.overlap)
    }
}

/// Parse DZI tile coordinates from a filename like "3_5.jpg".
///
/// The extension must match `extension`. Returns `(col, row)`.
pub fn parse_tile_file_name(file_name: &str, extension: &str) -> Option<(u32, u32)> {
    let name = file_name
        .strip_suffix(extension)?
        .strip_suffix('.')?;

    let (col, row) = name.split_once('_')?;
    if row.contains('_') {
        return None;
    }

    Some((col.parse().ok()?, row.parse().ok()?))
}
