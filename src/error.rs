use thiserror::Error;

/// Errors raised while planning or generating a tile pyramid.
///
/// Every variant carries enough context (dimensions, tile coordinates or the
/// offending path) to diagnose the failure without re-running the build.
#[derive(Debug, Clone, Error)]
pub enum PyramidError {
    /// Source image has a zero dimension
    #[error("Invalid source dimensions: {width}x{height} (both must be at least 1)")]
    InvalidDimension { width: u32, height: u32 },

    /// Tile size must be at least one pixel
    #[error("Invalid tile size: {0} (must be at least 1)")]
    InvalidTileSize(u32),

    /// Source image could not be opened or decoded
    #[error("Failed to decode source image {path}: {message}")]
    Decode { path: String, message: String },

    /// The codec rejected a tile
    #[error("Failed to encode tile {col}_{row} at level {level}: {message}")]
    Encode {
        level: u32,
        col: u32,
        row: u32,
        message: String,
    },

    /// A tile, directory or descriptor could not be written
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Descriptor document is malformed
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
}

impl PyramidError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        PyramidError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors that can occur when parsing a DZI descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Required element is absent
    #[error("Missing element: <{0}>")]
    MissingElement(&'static str),

    /// Required attribute is absent
    #[error("Missing attribute {attribute} on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Attribute value could not be interpreted
    #[error("Invalid value for {attribute}: {value:?}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    /// Root element declares a namespace other than the Deep Zoom schema
    #[error("Unexpected namespace: {0}")]
    UnexpectedNamespace(String),
}

/// Errors that can occur when publishing a pyramid to object storage
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Bucket not found
    #[error("Bucket not found: {0}")]
    NotFound(String),

    /// Local file could not be enumerated or read
    #[error("Local file error at {path}: {message}")]
    Local { path: String, message: String },
}
