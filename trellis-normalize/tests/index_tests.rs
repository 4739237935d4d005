use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use trellis_normalize::{
    build_entry_lists, build_foreign_reference_map, build_resolvable_set, content_type_label,
    ExistingEntity, FieldLabelMode,
};
use trellis_types::{
    entity_key, AssetRecord, ContentTypeSchema, EntryRecord, FieldType, Link, SchemaField,
    SchemaSys, Sys,
};

const DEFAULT: &str = "en-US";

fn schema(id: &str, name: &str, fields: Vec<SchemaField>) -> ContentTypeSchema {
    ContentTypeSchema {
        sys: SchemaSys {
            id: id.to_string(),
            updated_at: "t1".to_string(),
        },
        name: name.to_string(),
        display_field: "title".to_string(),
        description: String::new(),
        fields,
    }
}

fn sys(id: &str, sys_type: &str, content_type: Option<&str>) -> Sys {
    Sys {
        id: id.to_string(),
        sys_type: sys_type.to_string(),
        created_at: "t0".to_string(),
        updated_at: "t1".to_string(),
        revision: None,
        content_type: content_type.map(|ct| Link::new(ct, "ContentType")),
    }
}

fn entry(id: &str, content_type: &str, fields: Vec<(&str, Value)>) -> EntryRecord {
    let fields = fields
        .into_iter()
        .map(|(name, value)| {
            let mut bag = HashMap::new();
            bag.insert(DEFAULT.to_string(), value);
            (name.to_string(), bag)
        })
        .collect();
    EntryRecord {
        sys: sys(id, "Entry", Some(content_type)),
        fields,
        metadata: None,
    }
}

fn asset(id: &str) -> AssetRecord {
    AssetRecord {
        sys: sys(id, "Asset", None),
        fields: HashMap::new(),
        metadata: None,
    }
}

fn link(id: &str, link_type: &str) -> Value {
    json!({"sys": {"type": "Link", "linkType": link_type, "id": id}})
}

// ── Entry buckets ────────────────────────────────────────────────

#[test]
fn entries_bucketed_in_schema_order() {
    let schemas = vec![schema("post", "Post", vec![]), schema("author", "Author", vec![])];
    let entries = vec![
        entry("a1", "author", vec![]),
        entry("p1", "post", vec![]),
        entry("p2", "post", vec![]),
    ];
    let lists = build_entry_lists(&schemas, &entries);
    assert_eq!(lists.len(), 2);
    let post_ids: Vec<&str> = lists[0].iter().map(|e| e.sys.id.as_str()).collect();
    assert_eq!(post_ids, vec!["p1", "p2"]);
    assert_eq!(lists[1][0].sys.id, "a1");
}

#[test]
fn entries_with_unknown_content_type_are_dropped() {
    let schemas = vec![schema("post", "Post", vec![])];
    let entries = vec![entry("p1", "post", vec![]), entry("x1", "ghost", vec![])];
    let lists = build_entry_lists(&schemas, &entries);
    assert_eq!(lists[0].len(), 1);
}

// ── Resolvable set ───────────────────────────────────────────────

#[test]
fn resolvable_set_unions_existing_entries_and_assets() {
    let schemas = vec![schema("post", "Post", vec![])];
    let lists = build_entry_lists(&schemas, &[entry("p1", "post", vec![])]);
    let existing = vec![ExistingEntity {
        id: "old1".to_string(),
        entity_type: "Entry".to_string(),
    }];
    let assets = vec![asset("img1")];

    let set = build_resolvable_set(&lists, &existing, &assets);
    assert!(set.contains(&entity_key("p1", "Entry")));
    assert!(set.contains(&entity_key("old1", "Entry")));
    assert!(set.contains(&entity_key("img1", "Asset")));
    assert_eq!(set.len(), 3);
}

#[test]
fn resolvable_set_normalizes_deleted_types() {
    let existing = vec![ExistingEntity {
        id: "gone".to_string(),
        entity_type: "DeletedEntry".to_string(),
    }];
    let set = build_resolvable_set(&[], &existing, &[]);
    assert!(set.contains(&entity_key("gone", "Entry")));
}

// ── Foreign-reference map ────────────────────────────────────────

#[test]
fn single_link_records_one_reverse_edge() {
    let schemas = vec![schema(
        "post",
        "Blog Post",
        vec![SchemaField::new("author", FieldType::Link, false)],
    )];
    let entries = vec![entry("p1", "post", vec![("author", link("a1", "Entry"))])];
    let lists = build_entry_lists(&schemas, &entries);
    let mut resolvable = build_resolvable_set(&lists, &[], &[]);
    resolvable.insert(entity_key("a1", "Entry"));

    let map = build_foreign_reference_map(
        &schemas,
        &lists,
        &resolvable,
        DEFAULT,
        "space1",
        FieldLabelMode::HumanName,
    );
    let edges = &map[&entity_key("a1", "Entry")];
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].field_name, "blog post___NODE");
    assert_eq!(edges[0].owner_id, "p1");
    assert_eq!(edges[0].owner_space_id, "space1");
    assert_eq!(edges[0].owner_type, "Entry");
}

#[test]
fn link_array_records_edges_in_order() {
    let schemas = vec![schema(
        "gallery",
        "Gallery",
        vec![SchemaField::new("images", FieldType::LinkArray, false)],
    )];
    let entries = vec![
        entry("g1", "gallery", vec![("images", json!([link("i1", "Asset"), link("i2", "Asset")]))]),
        entry("g2", "gallery", vec![("images", json!([link("i1", "Asset")]))]),
    ];
    let lists = build_entry_lists(&schemas, &entries);
    let assets = vec![asset("i1"), asset("i2")];
    let resolvable = build_resolvable_set(&lists, &[], &assets);

    let map = build_foreign_reference_map(
        &schemas,
        &lists,
        &resolvable,
        DEFAULT,
        "space1",
        FieldLabelMode::HumanName,
    );
    let owners: Vec<&str> = map[&entity_key("i1", "Asset")]
        .iter()
        .map(|e| e.owner_id.as_str())
        .collect();
    assert_eq!(owners, vec!["g1", "g2"]);
    assert_eq!(map[&entity_key("i2", "Asset")].len(), 1);
}

#[test]
fn unresolvable_targets_are_skipped() {
    let schemas = vec![schema(
        "post",
        "Post",
        vec![SchemaField::new("author", FieldType::Link, false)],
    )];
    let entries = vec![entry("p1", "post", vec![("author", link("deleted", "Entry"))])];
    let lists = build_entry_lists(&schemas, &entries);
    let resolvable = build_resolvable_set(&lists, &[], &[]);

    let map = build_foreign_reference_map(
        &schemas,
        &lists,
        &resolvable,
        DEFAULT,
        "space1",
        FieldLabelMode::HumanName,
    );
    assert!(map.is_empty());
}

#[test]
fn label_mode_selects_name_or_id() {
    let s = schema("blogPost", "Blog Post", vec![]);
    assert_eq!(content_type_label(&s, FieldLabelMode::HumanName), "blog post");
    assert_eq!(content_type_label(&s, FieldLabelMode::SchemaId), "blogpost");
}

#[test]
fn non_default_locale_values_are_ignored() {
    let schemas = vec![schema(
        "post",
        "Post",
        vec![SchemaField::new("author", FieldType::Link, true)],
    )];
    let mut e = entry("p1", "post", vec![]);
    let mut bag = HashMap::new();
    bag.insert("de-DE".to_string(), link("a1", "Entry"));
    e.fields.insert("author".to_string(), bag);
    let lists = build_entry_lists(&schemas, &[e]);
    let mut resolvable = build_resolvable_set(&lists, &[], &[]);
    resolvable.insert(entity_key("a1", "Entry"));

    let map = build_foreign_reference_map(
        &schemas,
        &lists,
        &resolvable,
        DEFAULT,
        "space1",
        FieldLabelMode::HumanName,
    );
    assert!(map.is_empty());
}
