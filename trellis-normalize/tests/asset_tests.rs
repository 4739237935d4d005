use pretty_assertions::assert_eq;
use serde_json::json;
use trellis_normalize::{
    build_fallback_chain, AssetNormalizer, MemoryNodeStore, NodeStore, NormalizeConfig,
};
use trellis_types::{AssetRecord, FieldBag, Locale, Sys};

fn locales() -> Vec<Locale> {
    vec![
        Locale::new("en-US", true),
        Locale::with_fallback("de-DE", "en-US"),
    ]
}

fn config() -> NormalizeConfig {
    NormalizeConfig {
        space_id: "space1".to_string(),
        ..NormalizeConfig::default()
    }
}

fn asset(id: &str, updated_at: &str, fields: Vec<(&str, FieldBag)>) -> AssetRecord {
    AssetRecord {
        sys: Sys {
            id: id.to_string(),
            sys_type: "Asset".to_string(),
            created_at: "t0".to_string(),
            updated_at: updated_at.to_string(),
            revision: Some(2),
            content_type: None,
        },
        fields: fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        metadata: None,
    }
}

fn bag(pairs: &[(&str, serde_json::Value)]) -> FieldBag {
    pairs
        .iter()
        .map(|(code, value)| (code.to_string(), value.clone()))
        .collect()
}

fn run(assets: &[AssetRecord], store: &MemoryNodeStore) {
    let locales = locales();
    let chain = build_fallback_chain(&locales);
    let cfg = config();
    let normalizer = AssetNormalizer::new(&cfg, store, &chain);
    normalizer.normalize_assets(assets, &locales).unwrap();
}

// ── Node shape ───────────────────────────────────────────────────

#[test]
fn asset_node_per_locale_with_localized_fields() {
    let assets = vec![asset(
        "img1",
        "T1",
        vec![
            ("title", bag(&[("en-US", json!("A dog")), ("de-DE", json!("Ein Hund"))])),
            ("file", bag(&[("en-US", json!({"url": "//img/dog.png", "contentType": "image/png"}))])),
        ],
    )];
    let store = MemoryNodeStore::new();
    run(&assets, &store);

    let en = store.get_node("space1___img1___Asset").unwrap();
    let de = store.get_node("space1___img1___Asset___de-DE").unwrap();
    assert_eq!(en.internal.type_name, "Asset");
    assert_eq!(en.internal.content_digest, "T1");
    assert_eq!(en.field_str("title"), Some("A dog"));
    assert_eq!(de.field_str("title"), Some("Ein Hund"));
    // File has no de-DE value; the fallback chain supplies the en-US one.
    assert_eq!(
        de.field("file"),
        Some(&json!({"url": "//img/dog.png", "contentType": "image/png"}))
    );
    assert_eq!(de.field_str("node_locale"), Some("de-DE"));
}

#[test]
fn missing_title_and_description_default_to_empty_strings() {
    let assets = vec![asset("img1", "T1", vec![])];
    let store = MemoryNodeStore::new();
    run(&assets, &store);

    let node = store.get_node("space1___img1___Asset").unwrap();
    assert_eq!(node.field_str("title"), Some(""));
    assert_eq!(node.field_str("description"), Some(""));
    assert!(node.field("file").is_none());
}

#[test]
fn asset_sys_is_inlined_without_content_type() {
    let assets = vec![asset("img1", "T1", vec![])];
    let store = MemoryNodeStore::new();
    run(&assets, &store);

    let node = store.get_node("space1___img1___Asset").unwrap();
    let sys = node.field("sys").unwrap();
    assert_eq!(sys.get("type"), Some(&json!("Asset")));
    assert_eq!(sys.get("revision"), Some(&json!(2)));
    assert!(sys.get("contentType___NODE").is_none());
}

#[test]
fn assets_produce_no_children() {
    let assets = vec![asset(
        "img1",
        "T1",
        vec![("file", bag(&[("en-US", json!({"url": "//x"}))]))],
    )];
    let store = MemoryNodeStore::new();
    run(&assets, &store);
    let node = store.get_node("space1___img1___Asset").unwrap();
    assert!(node.children.is_empty());
    assert_eq!(store.len(), 2); // one node per locale, nothing else
}

// ── Digest skip ──────────────────────────────────────────────────

#[test]
fn unchanged_assets_are_skipped() {
    let assets = vec![asset("img1", "T1", vec![])];
    let store = MemoryNodeStore::new();
    run(&assets, &store);
    let writes = store.write_count();
    run(&assets, &store);
    assert_eq!(store.write_count(), writes);
}

#[test]
fn changed_assets_are_rebuilt() {
    let store = MemoryNodeStore::new();
    run(&[asset("img1", "T1", vec![])], &store);
    run(
        &[asset(
            "img1",
            "T2",
            vec![("title", bag(&[("en-US", json!("new"))]))],
        )],
        &store,
    );
    let node = store.get_node("space1___img1___Asset").unwrap();
    assert_eq!(node.internal.content_digest, "T2");
    assert_eq!(node.field_str("title"), Some("new"));
}
