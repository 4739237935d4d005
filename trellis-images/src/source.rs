use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_types::Node;

/// Raster media types the derivative engine operates on. Anything else
/// (SVGs, documents, video) yields no descriptor.
const RASTER_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// The slice of an asset node the derivative engine needs: remote URL,
/// declared media type, and source pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub url: String,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl ImageSource {
    /// Extracts an image source from an asset node's `file` field
    /// (`{url, contentType, details: {image: {width, height}}}`).
    pub fn from_node(node: &Node) -> Option<Self> {
        let file = node.field("file")?;
        let url = file.get("url").and_then(Value::as_str)?;
        let content_type = file.get("contentType").and_then(Value::as_str)?;
        let image = file.get("details")?.get("image")?;
        let width = image.get("width").and_then(Value::as_u64)?;
        let height = image.get("height").and_then(Value::as_u64)?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            content_type: content_type.to_string(),
            width: width as u32,
            height: height as u32,
        })
    }

    /// Whether the declared media type is in the raster allow-list.
    pub fn is_raster(&self) -> bool {
        RASTER_MEDIA_TYPES.contains(&self.content_type.as_str())
    }

    /// Source aspect ratio (width over height).
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}
