//! Completeness check of a generated pyramid.
//!
//! Re-plans the pyramid from its descriptor and compares the expected tile
//! set with the files actually present under the tile directory.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::PyramidError;
use crate::pyramid::PyramidPlan;

use super::descriptor::DziDescriptor;
use super::layout::PyramidLayout;

/// Outcome of [`verify_pyramid`]. Tiles are named `{level}/{col}_{row}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Number of tiles the descriptor implies
    pub expected: u64,

    /// Number of expected tiles found on disk
    pub found: u64,

    /// Expected tiles with no file
    pub missing: Vec<String>,

    /// Files under the tile directory that the plan does not contain
    pub unexpected: Vec<String>,
}

impl VerifyReport {
    /// Every expected tile is present and nothing else is.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Verify the pyramid described by `dzi_path`.
///
/// # Errors
///
/// Fails if the descriptor cannot be read or parsed, or if it describes an
/// impossible pyramid (zero dimensions or tile size).
pub fn verify_pyramid(dzi_path: &Path) -> Result<VerifyReport, PyramidError> {
    let descriptor = DziDescriptor::read_from(dzi_path)?;
    let layout = PyramidLayout::from_dzi_path(dzi_path)?;
    let plan = PyramidPlan::new(
        descriptor.width,
        descriptor.height,
        descriptor.tile_size,
        descriptor.overlap,
    )?;

    let mut expected = BTreeSet::new();
    for level in &plan.levels {
        for tile in plan.tiles_for(level) {
            expected.insert(format!(
                "{}/{}",
                level.index,
                tile.file_name(&descriptor.format)
            ));
        }
    }

    let tiles_dir = layout.tiles_dir();
    let mut present = BTreeSet::new();
    if tiles_dir.is_dir() {
        for entry in WalkDir::new(&tiles_dir).min_depth(1) {
            let entry = entry.map_err(|e| PyramidError::Io {
                path: tiles_dir.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&tiles_dir)
                .unwrap_or_else(|_| entry.path());
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            present.insert(key);
        }
    }

    let missing: Vec<String> = expected.difference(&present).cloned().collect();
    let unexpected: Vec<String> = present.difference(&expected).cloned().collect();
    let report = VerifyReport {
        expected: expected.len() as u64,
        found: (expected.len() - missing.len()) as u64,
        missing,
        unexpected,
    };

    debug!(
        dzi = %dzi_path.display(),
        expected = report.expected,
        found = report.found,
        "Verified pyramid"
    );

    Ok(report)
}
