//! Per-pass reference indexes.
//!
//! Reference resolution is two-pass: all indexes here are built once from
//! the full snapshot before any node is assembled, then consulted read-only
//! during normalization. Forward links are discovered per entry; reverse
//! edges are precomputed globally so target nodes can carry back-reference
//! fields without rescanning the snapshot.

use crate::NODE_FIELD_MARKER;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use trellis_types::{entity_key, AssetRecord, ContentTypeSchema, EntryRecord, Link};

/// How the back-reference field on a link target is labeled: from the
/// owning content type's human name, or from its raw schema id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabelMode {
    HumanName,
    SchemaId,
}

/// A root-level node that already exists in the store from a previous
/// sync pass. Existing roots stay legal link targets even when the current
/// (incremental) snapshot does not carry them.
#[derive(Debug, Clone)]
pub struct ExistingEntity {
    pub id: String,
    pub entity_type: String,
}

/// One reverse edge: `owner` holds a link field pointing at the keyed
/// entity. Direction here is the reverse of the authored link.
#[derive(Debug, Clone)]
pub struct ForeignReference {
    /// Back-reference field name on the target node, already suffixed
    /// with the node-reference marker.
    pub field_name: String,
    pub owner_id: String,
    pub owner_space_id: String,
    pub owner_type: String,
}

/// Entity key → reverse edges pointing at that entity, in discovery order.
pub type ForeignReferenceMap = HashMap<String, Vec<ForeignReference>>;

/// Lower-cased label for a content type, per the configured mode.
pub fn content_type_label(schema: &ContentTypeSchema, mode: FieldLabelMode) -> String {
    match mode {
        FieldLabelMode::HumanName => schema.name.to_lowercase(),
        FieldLabelMode::SchemaId => schema.sys.id.to_lowercase(),
    }
}

/// Buckets entries per content type, one bucket per schema in schema
/// order. Entries whose declared content-type id matches no schema are
/// dropped.
pub fn build_entry_lists(
    schemas: &[ContentTypeSchema],
    entries: &[EntryRecord],
) -> Vec<Vec<EntryRecord>> {
    schemas
        .iter()
        .map(|schema| {
            entries
                .iter()
                .filter(|e| e.content_type_id() == Some(schema.sys.id.as_str()))
                .cloned()
                .collect()
        })
        .collect()
}

/// Builds the set of entity keys that links may legally resolve against:
/// previously materialized root nodes plus the current snapshot's entries
/// and assets. Derived child nodes are never addressable targets.
pub fn build_resolvable_set(
    entry_lists: &[Vec<EntryRecord>],
    existing: &[ExistingEntity],
    assets: &[AssetRecord],
) -> HashSet<String> {
    let mut set: HashSet<String> = existing
        .iter()
        .map(|e| entity_key(&e.id, &e.entity_type))
        .collect();
    for bucket in entry_lists {
        for entry in bucket {
            set.insert(entity_key(&entry.sys.id, &entry.sys.sys_type));
        }
    }
    for asset in assets {
        set.insert(entity_key(&asset.sys.id, &asset.sys.sys_type));
    }
    set
}

/// Builds the reverse index from link targets to the entries that link to
/// them, scanning every content type's default-locale field values.
///
/// Unresolvable targets are skipped so no node ever carries a dangling
/// back-reference.
pub fn build_foreign_reference_map(
    schemas: &[ContentTypeSchema],
    entry_lists: &[Vec<EntryRecord>],
    resolvable: &HashSet<String>,
    default_locale: &str,
    space_id: &str,
    mode: FieldLabelMode,
) -> ForeignReferenceMap {
    let mut map: ForeignReferenceMap = HashMap::new();

    for (schema, bucket) in schemas.iter().zip(entry_lists) {
        let field_name = format!("{}{NODE_FIELD_MARKER}", content_type_label(schema, mode));
        for entry in bucket {
            for bag in entry.fields.values() {
                let Some(value) = bag.get(default_locale) else {
                    continue;
                };
                if Link::is_reference_array(value) {
                    for element in value.as_array().into_iter().flatten() {
                        if let Some(link) = Link::from_value(element) {
                            record_edge(&mut map, resolvable, &link, &field_name, entry, space_id);
                        }
                    }
                } else if let Some(link) = Link::from_value(value) {
                    record_edge(&mut map, resolvable, &link, &field_name, entry, space_id);
                }
            }
        }
    }
    map
}

fn record_edge(
    map: &mut ForeignReferenceMap,
    resolvable: &HashSet<String>,
    link: &Link,
    field_name: &str,
    owner: &EntryRecord,
    space_id: &str,
) {
    let key = entity_key(&link.id, &link.link_type);
    if !resolvable.contains(&key) {
        debug!(target_id = %link.id, "skipping reverse edge to unresolvable target");
        return;
    }
    map.entry(key).or_default().push(ForeignReference {
        field_name: field_name.to_string(),
        owner_id: owner.sys.id.clone(),
        owner_space_id: space_id.to_string(),
        owner_type: owner.sys.sys_type.clone(),
    });
}
