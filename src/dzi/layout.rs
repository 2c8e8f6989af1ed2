//! On-disk layout of a Deep Zoom pyramid.
//!
//! ```text
//! {output_dir}/{name}.dzi
//! {output_dir}/{name}_files/{level}/{col}_{row}.{ext}
//! ```

use std::path::{Path, PathBuf};

use crate::error::PyramidError;

/// Descriptor file extension.
pub const DZI_EXTENSION: &str = "dzi";

/// Suffix appended to the base name for the tile directory.
pub const TILES_DIR_SUFFIX: &str = "_files";

/// Paths of one pyramid rooted at an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidLayout {
    output_dir: PathBuf,
    name: String,
}

impl PyramidLayout {
    pub fn new(output_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            name: name.into(),
        }
    }

    /// Derive the layout from a descriptor path such as `out/sample1.dzi`.
    ///
    /// The base name is the file stem; any extension is ignored.
    pub fn from_dzi_path(dzi_path: &Path) -> Result<Self, PyramidError> {
        let name = dzi_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| PyramidError::Io {
                path: dzi_path.display().to_string(),
                message: "descriptor path has no file name".to_string(),
            })?;
        let output_dir = dzi_path.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self::new(output_dir, name))
    }

    /// Base name shared by the descriptor and the tile directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `{output_dir}/{name}.dzi`
    pub fn dzi_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.name, DZI_EXTENSION))
    }

    /// `{output_dir}/{name}_files`
    pub fn tiles_dir(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.name, TILES_DIR_SUFFIX))
    }

    /// `{output_dir}/{name}_files/{level}`
    pub fn level_dir(&self, level: u32) -> PathBuf {
        self.tiles_dir().join(level.to_string())
    }

    /// `{output_dir}/{name}_files/{level}/{col}_{row}.{extension}`
    pub fn tile_path(&self, level: u32, col: u32, row: u32, extension: &str) -> PathBuf {
        self.level_dir(level)
            .join(format!("{}_{}.{}", col, row, extension))
    }
}
