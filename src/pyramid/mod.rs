//! Pyramid planning and generation.
//!
//! - [`planner`]: pure level and tile geometry ([`PyramidPlan`])
//! - [`builder`]: decode, emit every level, write the descriptor
//!   ([`DeepZoomBuilder`])

pub mod builder;
pub mod planner;

pub use builder::{load_source, DeepZoomBuilder, PyramidSummary};
pub use planner::{
    calculate_max_level, level_dimensions, level_scale_factor, parse_tile_file_name, tile_grid,
    CropRect, PyramidLevel, PyramidPlan, TileSpec,
};
