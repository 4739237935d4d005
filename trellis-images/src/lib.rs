//! Image-derivative computation and placeholder caching for Trellis.
//!
//! Operates on previously normalized asset nodes, independently of the
//! normalization pass:
//! - [`derive`] computes fixed/fluid/resize request descriptors (candidate
//!   size sets, remote-API URLs) as pure functions over `(source, options)`
//! - [`placeholder`] fetches low-resolution base64 placeholders through a
//!   process-wide coalescing cache, and degrades gracefully when optional
//!   raster collaborators are absent
//!
//! Remote fetching and raster processing sit behind the [`AssetFetcher`]
//! and [`RasterOps`] traits; no HTTP client is linked here.

mod derive;
mod options;
mod placeholder;
mod source;
mod url;

pub use derive::{fixed, fluid, resize, FixedImage, FluidImage, ResizedImage, MAX_DIMENSION};
pub use options::{CropFocus, ImageFormat, ImageOptions, ResizingBehavior};
pub use placeholder::{
    base64_placeholder, dominant_color, traced_svg, AssetFetcher, FetchRequest, PlaceholderCache,
    RasterOps, NEUTRAL_FALLBACK_COLOR, PLACEHOLDER_WIDTH,
};
pub use source::ImageSource;
pub use url::{build_url, UrlParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur in the image subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Remote fetch failed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A coalesced placeholder fetch failed; the URL has been evicted so
    /// the next caller retries.
    #[error("placeholder fetch failed: {0}")]
    Placeholder(String),

    /// Local file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An optional raster-processing collaborator is missing or failed.
    #[error("raster processing unavailable: {0}")]
    RasterUnavailable(String),
}
