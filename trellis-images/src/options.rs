use serde::{Deserialize, Serialize};
use tracing::warn;

/// Output formats the remote image API supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Short parameter value for the remote API.
    pub fn param(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }

    /// Parses a requested output format. Unsupported values warn and
    /// yield `None` — callers degrade by omitting the format parameter
    /// rather than failing.
    pub fn parse_requested(requested: &str) -> Option<Self> {
        match requested {
            "jpg" | "jpeg" => Some(ImageFormat::Jpg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            other => {
                warn!(format = %other, "unsupported output image format, ignoring");
                None
            }
        }
    }
}

/// Crop/scale strategy for the remote image API's `fit` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizingBehavior {
    Pad,
    Crop,
    /// Fill/cover: resize to cover both dimensions, cropping overflow.
    Fill,
    Thumb,
    Scale,
}

impl ResizingBehavior {
    pub fn param(self) -> &'static str {
        match self {
            ResizingBehavior::Pad => "pad",
            ResizingBehavior::Crop => "crop",
            ResizingBehavior::Fill => "fill",
            ResizingBehavior::Thumb => "thumb",
            ResizingBehavior::Scale => "scale",
        }
    }
}

/// Focus area for cropping behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropFocus {
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Face,
    Faces,
}

impl CropFocus {
    pub fn param(self) -> &'static str {
        match self {
            CropFocus::Center => "center",
            CropFocus::Top => "top",
            CropFocus::Bottom => "bottom",
            CropFocus::Left => "left",
            CropFocus::Right => "right",
            CropFocus::TopLeft => "top_left",
            CropFocus::TopRight => "top_right",
            CropFocus::BottomLeft => "bottom_left",
            CropFocus::BottomRight => "bottom_right",
            CropFocus::Face => "face",
            CropFocus::Faces => "faces",
        }
    }
}

/// Caller-supplied options for derivative computation.
///
/// `width`/`height` drive [`fixed`](crate::fixed) and
/// [`resize`](crate::resize); `max_width`/`max_height` drive
/// [`fluid`](crate::fluid). When both axes of the relevant pair are
/// explicit, the aspect ratio they imply overrides the source's and the
/// fill behavior is defaulted.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// JPEG quality 1-100.
    pub quality: Option<u8>,
    /// Requested output format, as authored (may be unsupported).
    pub to_format: Option<String>,
    pub resizing_behavior: Option<ResizingBehavior>,
    pub crop_focus: Option<CropFocus>,
    /// Background for `pad` behavior, e.g. `"rgb:ffffff"`.
    pub background: Option<String>,
    /// Responsive `sizes` hint; a default is derived for fluid requests
    /// when unset.
    pub sizes: Option<String>,
    pub jpeg_progressive: bool,
}

impl ImageOptions {
    /// Resolved output format: parsed when supported, `None` (with a
    /// warning already logged) otherwise.
    pub fn format(&self) -> Option<ImageFormat> {
        self.to_format
            .as_deref()
            .and_then(ImageFormat::parse_requested)
    }
}
