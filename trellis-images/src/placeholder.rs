//! Low-resolution placeholder generation behind a coalescing cache.
//!
//! The cache memoizes pending asynchronous fetches as well as their
//! results: concurrent callers for the same thumbnail URL share a single
//! underlying fetch. Entries live for the life of the process; a failed
//! fetch is evicted so the next caller retries.

use crate::options::ImageOptions;
use crate::source::ImageSource;
use crate::url::{build_url, UrlParams};
use crate::{ImageError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

/// Width of placeholder thumbnails requested from the remote API.
pub const PLACEHOLDER_WIDTH: u32 = 20;

/// Color returned when raster processing is unavailable or fails.
pub const NEUTRAL_FALLBACK_COLOR: &str = "#808080";

/// Remote fetch request handed to the external fetch collaborator.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub cache_dir: PathBuf,
    pub name: Option<String>,
    pub ext: Option<String>,
}

/// Async remote fetch with on-disk caching, supplied by the embedder.
/// No timeout or retry is imposed at this layer.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetches the resource and returns the local file path.
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf>;
}

/// Optional raster-processing collaborators (tracing, dominant color).
#[async_trait]
pub trait RasterOps: Send + Sync {
    async fn trace_svg(&self, path: &Path) -> Result<String>;
    async fn dominant_color(&self, path: &Path) -> Result<String>;
}

type SharedFetch = Shared<BoxFuture<'static, std::result::Result<String, Arc<ImageError>>>>;

/// A cached placeholder is either still being fetched or resolved.
/// Holding both states in one slot keeps the check-then-insert atomic
/// under a single lock.
enum Slot {
    Pending(SharedFetch),
    Resolved(String),
}

/// Process-wide placeholder cache keyed by the fully built thumbnail URL.
#[derive(Default)]
pub struct PlaceholderCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl PlaceholderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached payload for `url`, joining an in-flight fetch
    /// when one exists, or dispatching `fetch` otherwise.
    ///
    /// Only the first caller's future is ever polled; later callers'
    /// futures are dropped unpolled. A failed fetch rejects every
    /// coalesced waiter and evicts the slot.
    pub async fn get<F>(&self, url: &str, fetch: F) -> Result<String>
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        let shared = {
            let mut slots = self.slots.lock().expect("placeholder cache poisoned");
            match slots.get(url) {
                Some(Slot::Resolved(payload)) => return Ok(payload.clone()),
                Some(Slot::Pending(shared)) => {
                    debug!(%url, "joining in-flight placeholder fetch");
                    shared.clone()
                }
                None => {
                    let shared = fetch.map(|r| r.map_err(Arc::new)).boxed().shared();
                    slots.insert(url.to_string(), Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        let result = shared.await;
        let mut slots = self.slots.lock().expect("placeholder cache poisoned");
        match result {
            Ok(payload) => {
                slots.insert(url.to_string(), Slot::Resolved(payload.clone()));
                Ok(payload)
            }
            Err(err) => {
                if matches!(slots.get(url), Some(Slot::Pending(_))) {
                    slots.remove(url);
                }
                Err(ImageError::Placeholder(err.to_string()))
            }
        }
    }

    /// Number of resolved entries, for diagnostics.
    pub fn resolved_count(&self) -> usize {
        self.slots
            .lock()
            .expect("placeholder cache poisoned")
            .values()
            .filter(|slot| matches!(slot, Slot::Resolved(_)))
            .count()
    }
}

/// Fetches (through the cache) a base64 `data:` URI placeholder for an
/// image source: a [`PLACEHOLDER_WIDTH`]-wide thumbnail, fetched once and
/// memoized by its URL.
pub async fn base64_placeholder(
    source: &ImageSource,
    options: &ImageOptions,
    cache: &PlaceholderCache,
    fetcher: Arc<dyn AssetFetcher>,
    cache_dir: &Path,
) -> Result<String> {
    let height = (f64::from(PLACEHOLDER_WIDTH) / source.aspect_ratio())
        .round()
        .max(1.0) as u32;
    let format = options.format();
    let url = build_url(
        &source.url,
        &UrlParams {
            width: Some(PLACEHOLDER_WIDTH),
            height: Some(height),
            format,
            quality: options.quality,
            progressive: false,
            behavior: options.resizing_behavior,
            focus: options.crop_focus,
            background: options.background.as_deref(),
        },
    );
    let media_type = format
        .map(|f| format!("image/{}", f.param()))
        .unwrap_or_else(|| source.content_type.clone());

    let request = FetchRequest {
        url: url.clone(),
        cache_dir: cache_dir.to_path_buf(),
        name: None,
        ext: None,
    };
    cache
        .get(&url, async move {
            let path = fetcher.fetch(&request).await?;
            let bytes = tokio::fs::read(&path).await?;
            Ok(format!("data:{media_type};base64,{}", BASE64.encode(bytes)))
        })
        .await
}

/// Traced-SVG placeholder via the optional raster collaborator. Absence
/// or failure logs and yields `None` instead of propagating.
pub async fn traced_svg(ops: Option<&dyn RasterOps>, path: &Path) -> Option<String> {
    let Some(ops) = ops else {
        error!("traced SVG requested but no raster collaborator is configured");
        return None;
    };
    match ops.trace_svg(path).await {
        Ok(svg) => Some(svg),
        Err(err) => {
            error!(%err, "SVG tracing failed");
            None
        }
    }
}

/// Dominant color via the optional raster collaborator. Absence or
/// failure logs and yields [`NEUTRAL_FALLBACK_COLOR`].
pub async fn dominant_color(ops: Option<&dyn RasterOps>, path: &Path) -> String {
    let Some(ops) = ops else {
        error!("dominant color requested but no raster collaborator is configured");
        return NEUTRAL_FALLBACK_COLOR.to_string();
    };
    match ops.dominant_color(path).await {
        Ok(color) => color,
        Err(err) => {
            error!(%err, "dominant color extraction failed");
            NEUTRAL_FALLBACK_COLOR.to_string()
        }
    }
}
