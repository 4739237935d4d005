//! Deterministic query-string construction for the remote image API.

use crate::options::{CropFocus, ImageFormat, ResizingBehavior};

/// Semantic request parameters, mapped onto the remote API's short names
/// (`w h fm q fl fit f bg`). Absent values are omitted from the URL.
#[derive(Debug, Clone, Default)]
pub struct UrlParams<'a> {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<ImageFormat>,
    pub quality: Option<u8>,
    pub progressive: bool,
    pub behavior: Option<ResizingBehavior>,
    pub focus: Option<CropFocus>,
    pub background: Option<&'a str>,
}

/// Builds a request URL. Parameter order is fixed so identical inputs
/// always produce the identical string.
pub fn build_url(base_url: &str, params: &UrlParams) -> String {
    let mut query: Vec<String> = Vec::new();
    if let Some(w) = params.width {
        query.push(format!("w={w}"));
    }
    if let Some(h) = params.height {
        query.push(format!("h={h}"));
    }
    if let Some(format) = params.format {
        query.push(format!("fm={}", format.param()));
    }
    if let Some(q) = params.quality {
        query.push(format!("q={q}"));
    }
    if params.progressive {
        query.push("fl=progressive".to_string());
    }
    if let Some(behavior) = params.behavior {
        query.push(format!("fit={}", behavior.param()));
    }
    if let Some(focus) = params.focus {
        query.push(format!("f={}", focus.param()));
    }
    if let Some(bg) = params.background {
        query.push(format!("bg={}", urlencoding::encode(bg)));
    }
    if query.is_empty() {
        base_url.to_string()
    } else {
        format!("{base_url}?{}", query.join("&"))
    }
}
