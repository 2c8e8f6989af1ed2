//! Deep Zoom descriptor (`.dzi`) document.
//!
//! # Example Output
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Image xmlns="http://schemas.microsoft.com/deepzoom/2008" Format="jpg" Overlap="1" TileSize="254">
//!   <Size Width="512" Height="300" />
//! </Image>
//! ```
//!
//! Viewers read the document structurally, so only element names, attribute
//! names and nesting matter. The parser accepts any attribute order, either
//! quote style, and arbitrary whitespace.

use std::fs;
use std::path::Path;

use crate::error::{DescriptorError, PyramidError};

/// Deep Zoom schema namespace.
pub const DZI_NAMESPACE: &str = "http://schemas.microsoft.com/deepzoom/2008";

/// The descriptor of one pyramid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DziDescriptor {
    /// Tile file extension, e.g. `jpg`
    pub format: String,

    /// Overlap in pixels
    pub overlap: u32,

    /// Tile size in pixels, excluding overlap
    pub tile_size: u32,

    /// Source image width
    pub width: u32,

    /// Source image height
    pub height: u32,
}

impl DziDescriptor {
    pub fn new(
        format: impl Into<String>,
        overlap: u32,
        tile_size: u32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            format: format.into(),
            overlap,
            tile_size,
            width,
            height,
        }
    }

    /// Serialize as an indented UTF-8 XML document.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="{DZI_NAMESPACE}" Format="{}" Overlap="{}" TileSize="{}">
  <Size Width="{}" Height="{}" />
</Image>
"#,
            escape_attribute(&self.format),
            self.overlap,
            self.tile_size,
            self.width,
            self.height
        )
    }

    /// Parse a descriptor document.
    pub fn parse(xml: &str) -> Result<Self, DescriptorError> {
        let image = find_start_tag(xml, "Image").ok_or(DescriptorError::MissingElement("Image"))?;
        let size = find_start_tag(xml, "Size").ok_or(DescriptorError::MissingElement("Size"))?;

        if let Some(namespace) = attribute(image, "xmlns") {
            if namespace != DZI_NAMESPACE {
                return Err(DescriptorError::UnexpectedNamespace(namespace.to_string()));
            }
        }

        let format = attribute(image, "Format").ok_or(DescriptorError::MissingAttribute {
            element: "Image",
            attribute: "Format",
        })?;
        if format.is_empty() {
            return Err(DescriptorError::InvalidAttribute {
                attribute: "Format",
                value: String::new(),
            });
        }

        Ok(Self {
            format: unescape_attribute(format),
            overlap: numeric_attribute(image, "Image", "Overlap")?,
            tile_size: numeric_attribute(image, "Image", "TileSize")?,
            width: numeric_attribute(size, "Size", "Width")?,
            height: numeric_attribute(size, "Size", "Height")?,
        })
    }

    /// Write the document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), PyramidError> {
        fs::write(path, self.to_xml()).map_err(|e| PyramidError::io(path, e))
    }

    /// Read and parse the document at `path`.
    pub fn read_from(path: &Path) -> Result<Self, PyramidError> {
        let xml = fs::read_to_string(path).map_err(|e| PyramidError::io(path, e))?;
        Ok(Self::parse(&xml)?)
    }
}

/// Contents of the first `<name ...>` start tag, without the brackets.
fn find_start_tag<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("<{}", name);
    let mut search_from = 0;

    while let Some(found) = xml[search_from..].find(&needle) {
        let start = search_from + found + 1;
        let after_name = start + name.len();
        // Reject longer names sharing the prefix, e.g. <ImageFoo
        let boundary = xml[after_name..].chars().next()?;
        if boundary.is_whitespace() || boundary == '>' || boundary == '/' {
            let end = after_name + xml[after_name..].find('>')?;
            return Some(&xml[after_name..end]);
        }
        search_from = after_name;
    }

    None
}

/// Value of attribute `name` inside a start tag body.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let eq = rest.find('=')?;
        let key = rest[..eq].trim();
        let value_part = rest[eq + 1..].trim_start();
        let quote = value_part.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let close = value_part[1..].find(quote)?;
        let value = &value_part[1..1 + close];

        if key == name {
            return Some(value);
        }
        rest = &value_part[close + 2..];
    }
}

fn numeric_attribute(
    tag: &str,
    element: &'static str,
    name: &'static str,
) -> Result<u32, DescriptorError> {
    let raw = attribute(tag, name).ok_or(DescriptorError::MissingAttribute {
        element,
        attribute: name,
    })?;

    raw.trim()
        .parse()
        .map_err(|_| DescriptorError::InvalidAttribute {
            attribute: name,
            value: raw.to_string(),
        })
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
