use pretty_assertions::assert_eq;
use proptest::prelude::*;
use trellis_images::{fixed, fluid, resize, ImageOptions, ImageSource, MAX_DIMENSION};

const URL: &str = "https://images.example/dog.png";

fn source(width: u32, height: u32) -> ImageSource {
    ImageSource {
        url: URL.to_string(),
        content_type: "image/png".to_string(),
        width,
        height,
    }
}

/// Extracts the candidate widths from a srcset string, in order.
fn srcset_widths(src_set: &str) -> Vec<u32> {
    src_set
        .split(", ")
        .map(|entry| {
            let url = entry.split_whitespace().next().unwrap();
            let w = url.split("w=").nth(1).unwrap();
            w.split('&').next().unwrap().parse().unwrap()
        })
        .collect()
}

// ── Fixed ────────────────────────────────────────────────────────

#[test]
fn fixed_defaults_to_400_with_density_candidates() {
    let image = fixed(&source(2000, 1000), &ImageOptions::default()).unwrap();
    assert_eq!(image.width, 400);
    assert_eq!(image.height, 200);
    assert_eq!(image.aspect_ratio, 2.0);
    assert_eq!(image.src, format!("{URL}?w=400&h=200"));
    assert_eq!(
        image.src_set,
        format!(
            "{URL}?w=400&h=200 1x, {URL}?w=600&h=300 1.5x, {URL}?w=800&h=400 2x, {URL}?w=1200&h=600 3x"
        )
    );
}

#[test]
fn fixed_drops_candidates_beyond_source_width() {
    let image = fixed(&source(700, 700), &ImageOptions { width: Some(400), ..Default::default() })
        .unwrap();
    // 400 and 600 fit in a 700px source; 800 and 1200 do not.
    assert_eq!(srcset_widths(&image.src_set), vec![400, 600]);
}

#[test]
fn fixed_clamps_base_width_to_tiny_sources() {
    let image = fixed(&source(300, 300), &ImageOptions::default()).unwrap();
    assert_eq!(image.width, 300);
    assert_eq!(srcset_widths(&image.src_set), vec![300]);
}

#[test]
fn fixed_width_from_height_via_aspect() {
    let image = fixed(&source(2000, 1000), &ImageOptions { height: Some(100), ..Default::default() })
        .unwrap();
    assert_eq!(image.width, 200);
    assert_eq!(image.height, 100);
}

#[test]
fn fixed_caps_dimensions_at_4000() {
    let image = fixed(
        &source(10000, 10000),
        &ImageOptions { width: Some(6000), ..Default::default() },
    )
    .unwrap();
    assert_eq!(image.width, 4000);
    assert!(srcset_widths(&image.src_set).iter().all(|&w| w <= MAX_DIMENSION));
}

#[test]
fn fixed_defaults_fill_only_when_both_dimensions_explicit() {
    let both = fixed(
        &source(2000, 1000),
        &ImageOptions { width: Some(400), height: Some(400), ..Default::default() },
    )
    .unwrap();
    assert!(both.src.contains("fit=fill"));
    assert_eq!(both.aspect_ratio, 1.0);

    let width_only = fixed(
        &source(2000, 1000),
        &ImageOptions { width: Some(400), ..Default::default() },
    )
    .unwrap();
    assert!(!width_only.src.contains("fit="));
}

// ── Fluid ────────────────────────────────────────────────────────

#[test]
fn fluid_defaults_to_800_and_includes_source_width() {
    let image = fluid(&source(4000, 2000), &ImageOptions::default()).unwrap();
    assert_eq!(
        srcset_widths(&image.src_set),
        vec![200, 400, 800, 1200, 1600, 2400, 4000]
    );
    assert_eq!(image.src, format!("{URL}?w=800"));
    assert_eq!(image.sizes, "(max-width: 800px) 100vw, 800px");
    assert!(image.src_set.contains(&format!("{URL}?w=200 200w")));
}

#[test]
fn fluid_candidates_are_sorted_and_deduplicated() {
    // Source width 1200 collides with the 1.5x candidate.
    let image = fluid(&source(1200, 600), &ImageOptions::default()).unwrap();
    let widths = srcset_widths(&image.src_set);
    let mut sorted = widths.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(widths, sorted);
    assert_eq!(widths, vec![200, 400, 800, 1200]);
}

#[test]
fn fluid_respects_caller_sizes() {
    let image = fluid(
        &source(4000, 2000),
        &ImageOptions { sizes: Some("100vw".to_string()), ..Default::default() },
    )
    .unwrap();
    assert_eq!(image.sizes, "100vw");
}

#[test]
fn fluid_filters_to_source_width() {
    let image = fluid(&source(900, 450), &ImageOptions::default()).unwrap();
    assert!(srcset_widths(&image.src_set).iter().all(|&w| w <= 900));
}

#[test]
fn fluid_fill_and_heights_when_both_max_dimensions_explicit() {
    let image = fluid(
        &source(4000, 2000),
        &ImageOptions { max_width: Some(800), max_height: Some(800), ..Default::default() },
    )
    .unwrap();
    assert!(image.src.contains("fit=fill"));
    assert!(image.src.contains("h=800"));
    assert_eq!(image.aspect_ratio, 1.0);
}

// ── Resize ───────────────────────────────────────────────────────

#[test]
fn resize_builds_single_variant() {
    let image = resize(
        &source(2000, 1000),
        &ImageOptions { width: Some(100), ..Default::default() },
    )
    .unwrap();
    assert_eq!(image.width, 100);
    assert_eq!(image.height, 50);
    assert_eq!(image.src, format!("{URL}?w=100&h=50"));
}

#[test]
fn resize_defaults_like_fixed() {
    let image = resize(&source(2000, 1000), &ImageOptions::default()).unwrap();
    assert_eq!(image.width, 400);
}

// ── Shared guards ────────────────────────────────────────────────

#[test]
fn non_raster_media_types_yield_no_descriptor() {
    let svg = ImageSource {
        url: URL.to_string(),
        content_type: "image/svg+xml".to_string(),
        width: 100,
        height: 100,
    };
    assert!(fixed(&svg, &ImageOptions::default()).is_none());
    assert!(fluid(&svg, &ImageOptions::default()).is_none());
    assert!(resize(&svg, &ImageOptions::default()).is_none());
}

#[test]
fn unsupported_output_format_is_omitted_not_fatal() {
    let options = ImageOptions {
        to_format: Some("tiff".to_string()),
        ..Default::default()
    };
    let image = fixed(&source(2000, 1000), &options).unwrap();
    assert!(!image.src.contains("fm="));

    let supported = ImageOptions {
        to_format: Some("webp".to_string()),
        ..Default::default()
    };
    let image = fixed(&source(2000, 1000), &supported).unwrap();
    assert!(image.src.contains("fm=webp"));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn fixed_candidates_bounded_and_ascending(
        src_w in 1u32..8000,
        src_h in 1u32..8000,
        requested in prop::option::of(1u32..10000),
    ) {
        let options = ImageOptions { width: requested, ..Default::default() };
        let image = fixed(&source(src_w, src_h), &options).unwrap();
        let widths = srcset_widths(&image.src_set);
        prop_assert!(!widths.is_empty());
        let limit = src_w.min(MAX_DIMENSION);
        prop_assert!(widths.iter().all(|&w| w <= limit));
        prop_assert!(widths.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn fluid_candidates_bounded_and_ascending(
        src_w in 1u32..8000,
        src_h in 1u32..8000,
        max_width in prop::option::of(1u32..10000),
    ) {
        let options = ImageOptions { max_width, ..Default::default() };
        let image = fluid(&source(src_w, src_h), &options).unwrap();
        let widths = srcset_widths(&image.src_set);
        let limit = src_w.min(MAX_DIMENSION);
        prop_assert!(widths.iter().all(|&w| w <= limit));
        prop_assert!(widths.windows(2).all(|p| p[0] < p[1]));
    }
}
