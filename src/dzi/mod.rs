//! Deep Zoom Image (DZI) format support.
//!
//! - [`descriptor`]: the `.dzi` XML document (write and parse)
//! - [`layout`]: where the descriptor and tiles live on disk
//! - [`verify`]: completeness check of a generated pyramid
//!
//! Deep Zoom numbers levels from the coarsest upwards: level 0 is 1x1 and
//! the highest level is the full-resolution image.

pub mod descriptor;
pub mod layout;
pub mod verify;

pub use descriptor::{DziDescriptor, DZI_NAMESPACE};
pub use layout::{PyramidLayout, DZI_EXTENSION, TILES_DIR_SUFFIX};
pub use verify::{verify_pyramid, VerifyReport};
