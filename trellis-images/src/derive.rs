//! Responsive derivative descriptors: fixed, fluid, and single resize.
//!
//! Pure functions over `(source, options)`. Non-raster sources yield
//! `None`; everything else is deterministic arithmetic plus URL assembly.

use crate::options::{ImageOptions, ResizingBehavior};
use crate::source::ImageSource;
use crate::url::{build_url, UrlParams};
use serde::{Deserialize, Serialize};

/// Hard cap on either axis of a requested derivative. When one axis is
/// clamped the other is rescaled to preserve the aspect ratio.
pub const MAX_DIMENSION: u32 = 4000;

const DEFAULT_FIXED_WIDTH: u32 = 400;
const DEFAULT_FLUID_MAX_WIDTH: u32 = 800;

/// Density multipliers for fixed candidate widths.
const FIXED_DENSITIES: &[f64] = &[1.0, 1.5, 2.0, 3.0];
/// Fractions of the max width for fluid candidate widths.
const FLUID_RATIOS: &[f64] = &[0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

/// Descriptor for a literal-size request with density variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traced_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub aspect_ratio: f64,
    pub width: u32,
    pub height: u32,
    pub src: String,
    pub src_set: String,
}

/// Descriptor for a max-width request with width variants and a
/// responsive `sizes` hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traced_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub aspect_ratio: f64,
    pub src: String,
    pub src_set: String,
    pub sizes: String,
}

/// Descriptor for a single-size request, no candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizedImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    pub aspect_ratio: f64,
    pub width: u32,
    pub height: u32,
    pub src: String,
}

/// Computes a fixed-size descriptor. Candidate widths at 1×/1.5×/2×/3×
/// of the target, dropping candidates exceeding the source width or
/// [`MAX_DIMENSION`]; the candidate set is ordered ascending.
pub fn fixed(source: &ImageSource, options: &ImageOptions) -> Option<FixedImage> {
    if !source.is_raster() {
        return None;
    }
    let aspect = aspect_for(source, options.width, options.height);
    let target = options
        .width
        .or_else(|| options.height.map(|h| scale(h, aspect)))
        .unwrap_or(DEFAULT_FIXED_WIDTH);
    let (target, _) = clamp_dimensions(target, scale_down(target, aspect));
    // The 1x candidate always survives filtering.
    let base = target.min(source.width);
    let height = scale_down(base, aspect);

    let limit = source.width.min(MAX_DIMENSION);
    let behavior = fill_when_both(options.resizing_behavior, options.width, options.height);
    let format = options.format();

    let mut entries: Vec<String> = Vec::new();
    let mut last_width = None;
    for &density in FIXED_DENSITIES {
        let width = (f64::from(base) * density).round() as u32;
        // Rounding can collide adjacent densities for tiny base widths.
        if width > limit || last_width == Some(width) {
            continue;
        }
        last_width = Some(width);
        let params = UrlParams {
            width: Some(width),
            height: Some(scale_down(width, aspect)),
            format,
            quality: options.quality,
            progressive: options.jpeg_progressive,
            behavior,
            focus: options.crop_focus,
            background: options.background.as_deref(),
        };
        entries.push(format!(
            "{} {}",
            build_url(&source.url, &params),
            format_density(density)
        ));
    }

    let src = build_url(
        &source.url,
        &UrlParams {
            width: Some(base),
            height: Some(height),
            format,
            quality: options.quality,
            progressive: options.jpeg_progressive,
            behavior,
            focus: options.crop_focus,
            background: options.background.as_deref(),
        },
    );

    Some(FixedImage {
        base64: None,
        traced_svg: None,
        background_color: None,
        aspect_ratio: aspect,
        width: base,
        height,
        src,
        src_set: entries.join(", "),
    })
}

/// Computes a fluid descriptor. Candidate widths at ¼/½/1/1.5/2/3 of the
/// max width plus the source width itself, filtered and sorted ascending;
/// derives a default `sizes` hint when the caller supplied none.
pub fn fluid(source: &ImageSource, options: &ImageOptions) -> Option<FluidImage> {
    if !source.is_raster() {
        return None;
    }
    let aspect = aspect_for(source, options.max_width, options.max_height);
    let target = options
        .max_width
        .or_else(|| options.max_height.map(|h| scale(h, aspect)))
        .unwrap_or(DEFAULT_FLUID_MAX_WIDTH);
    let (max_width, _) = clamp_dimensions(target, scale_down(target, aspect));

    let limit = source.width.min(MAX_DIMENSION);
    let both_explicit = options.max_width.is_some() && options.max_height.is_some();
    let behavior = fill_when_both(options.resizing_behavior, options.max_width, options.max_height);
    let format = options.format();

    let mut widths: Vec<u32> = FLUID_RATIOS
        .iter()
        .map(|r| (f64::from(max_width) * r).round() as u32)
        .chain(std::iter::once(source.width))
        .filter(|&w| w > 0 && w <= limit)
        .collect();
    widths.sort_unstable();
    widths.dedup();

    let entries: Vec<String> = widths
        .iter()
        .map(|&width| {
            let params = UrlParams {
                width: Some(width),
                height: both_explicit.then(|| scale_down(width, aspect)),
                format,
                quality: options.quality,
                progressive: options.jpeg_progressive,
                behavior,
                focus: options.crop_focus,
                background: options.background.as_deref(),
            };
            format!("{} {width}w", build_url(&source.url, &params))
        })
        .collect();

    let src = build_url(
        &source.url,
        &UrlParams {
            width: Some(max_width),
            height: both_explicit.then(|| scale_down(max_width, aspect)),
            format,
            quality: options.quality,
            progressive: options.jpeg_progressive,
            behavior,
            focus: options.crop_focus,
            background: options.background.as_deref(),
        },
    );

    let sizes = options
        .sizes
        .clone()
        .unwrap_or_else(|| format!("(max-width: {max_width}px) 100vw, {max_width}px"));

    Some(FluidImage {
        base64: None,
        traced_svg: None,
        background_color: None,
        aspect_ratio: aspect,
        src,
        src_set: entries.join(", "),
        sizes,
    })
}

/// Computes a single-size descriptor with fixed-style defaulting and no
/// candidate set.
pub fn resize(source: &ImageSource, options: &ImageOptions) -> Option<ResizedImage> {
    if !source.is_raster() {
        return None;
    }
    let aspect = aspect_for(source, options.width, options.height);
    let target = options
        .width
        .or_else(|| options.height.map(|h| scale(h, aspect)))
        .unwrap_or(DEFAULT_FIXED_WIDTH);
    let (width, height) = clamp_dimensions(target, scale_down(target, aspect));
    let behavior = fill_when_both(options.resizing_behavior, options.width, options.height);

    let src = build_url(
        &source.url,
        &UrlParams {
            width: Some(width),
            height: Some(height),
            format: options.format(),
            quality: options.quality,
            progressive: options.jpeg_progressive,
            behavior,
            focus: options.crop_focus,
            background: options.background.as_deref(),
        },
    );

    Some(ResizedImage {
        base64: None,
        aspect_ratio: aspect,
        width,
        height,
        src,
    })
}

/// Explicit width and height together express a cropping intent and
/// override the source aspect ratio.
fn aspect_for(source: &ImageSource, width: Option<u32>, height: Option<u32>) -> f64 {
    match (width, height) {
        (Some(w), Some(h)) if h > 0 => f64::from(w) / f64::from(h),
        _ => source.aspect_ratio(),
    }
}

/// Pure scale/downscale requests never force cropping; the fill/cover
/// strategy is defaulted only when both axes are explicitly requested.
fn fill_when_both(
    requested: Option<ResizingBehavior>,
    width: Option<u32>,
    height: Option<u32>,
) -> Option<ResizingBehavior> {
    requested.or_else(|| (width.is_some() && height.is_some()).then_some(ResizingBehavior::Fill))
}

/// Caps both axes at [`MAX_DIMENSION`], rescaling the other axis to
/// preserve the aspect ratio when one is clamped.
fn clamp_dimensions(width: u32, height: u32) -> (u32, u32) {
    let (mut w, mut h) = (f64::from(width), f64::from(height));
    let max = f64::from(MAX_DIMENSION);
    if w > max {
        h *= max / w;
        w = max;
    }
    if h > max {
        w *= max / h;
        h = max;
    }
    (w.round() as u32, h.round() as u32)
}

/// Width implied by a height at the given aspect ratio.
fn scale(height: u32, aspect: f64) -> u32 {
    (f64::from(height) * aspect).round().max(1.0) as u32
}

/// Height implied by a width at the given aspect ratio.
fn scale_down(width: u32, aspect: f64) -> u32 {
    (f64::from(width) / aspect).round().max(1.0) as u32
}

fn format_density(density: f64) -> String {
    if density.fract() == 0.0 {
        format!("{}x", density as u32)
    } else {
        format!("{density}x")
    }
}
