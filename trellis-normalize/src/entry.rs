//! Entry normalization: schema-driven assembly of entry nodes, derived
//! child nodes, and reference fields.
//!
//! Processing is per content type, per locale, per entry. Field handling
//! dispatches on the schema's declared field type; the raw value is never
//! type-sniffed except for link recognition inside declared link fields.

use crate::index::{content_type_label, FieldLabelMode, ForeignReferenceMap};
use crate::locale::{resolve_localized_value, FallbackChain};
use crate::store::NodeStore;
use crate::{NormalizeError, Result, NODE_FIELD_MARKER};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};
use trellis_types::{
    entity_key, make_id, ContentTypeSchema, EntryRecord, FieldType, Link, Locale, Node,
};

/// Configuration for a normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Space the snapshot belongs to; part of every derived id.
    pub space_id: String,
    /// Prefix applied to source fields whose id collides with a reserved
    /// node field name.
    pub conflict_field_prefix: String,
    /// How content-type labels (node type names, back-reference fields)
    /// are derived.
    pub field_label_mode: FieldLabelMode,
    /// Whether `metadata.tags` is resolved into a tag back-reference list.
    pub enable_tags: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            space_id: String::new(),
            conflict_field_prefix: "source".to_string(),
            field_label_mode: FieldLabelMode::HumanName,
            enable_tags: false,
        }
    }
}

/// Normalizes one content type's entries into nodes.
///
/// Holds the per-pass indexes read-only; the only mutable state is the
/// conflict-warning dedup set.
pub struct EntryNormalizer<'a> {
    config: &'a NormalizeConfig,
    store: &'a dyn NodeStore,
    fallback_chain: &'a FallbackChain,
    resolvable: &'a HashSet<String>,
    foreign_references: &'a ForeignReferenceMap,
    warned_conflicts: HashSet<(String, String)>,
}

impl<'a> EntryNormalizer<'a> {
    pub fn new(
        config: &'a NormalizeConfig,
        store: &'a dyn NodeStore,
        fallback_chain: &'a FallbackChain,
        resolvable: &'a HashSet<String>,
        foreign_references: &'a ForeignReferenceMap,
    ) -> Self {
        Self {
            config,
            store,
            fallback_chain,
            resolvable,
            foreign_references,
            warned_conflicts: HashSet::new(),
        }
    }

    /// Normalizes all entries of one content type across all locales, and
    /// (re)emits the content-type node itself.
    ///
    /// The content-type node is emitted every pass regardless of entry
    /// digests; entry and child nodes are skipped when their digest is
    /// unchanged in the store.
    pub fn normalize_content_type(
        &mut self,
        schema: &ContentTypeSchema,
        entries: &[EntryRecord],
        locales: &[Locale],
    ) -> Result<()> {
        let default_locale = default_locale(locales)?;
        let content_type_node_id = self.emit_content_type_node(schema, default_locale)?;

        let label = content_type_label(schema, self.config.field_label_mode);
        let type_name = pascal_case(&label);

        for locale in locales {
            for entry in entries {
                self.normalize_entry(
                    schema,
                    entry,
                    locale,
                    default_locale,
                    &content_type_node_id,
                    &type_name,
                    &label,
                )?;
            }
        }
        Ok(())
    }

    fn emit_content_type_node(
        &self,
        schema: &ContentTypeSchema,
        default_locale: &str,
    ) -> Result<String> {
        let raw_id = make_id(
            &self.config.space_id,
            &schema.sys.id,
            default_locale,
            default_locale,
            "ContentType",
        );
        let id = self.store.create_node_id(&raw_id);
        let mut node = Node::new(&id, "ContentType", &schema.sys.updated_at);
        node.fields
            .insert("name".to_string(), Value::String(schema.name.clone()));
        node.fields.insert(
            "displayField".to_string(),
            Value::String(schema.display_field.clone()),
        );
        node.fields.insert(
            "description".to_string(),
            Value::String(schema.description.clone()),
        );
        self.store.create_node(node)?;
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn normalize_entry(
        &mut self,
        schema: &ContentTypeSchema,
        entry: &EntryRecord,
        locale: &Locale,
        default_locale: &str,
        content_type_node_id: &str,
        type_name: &str,
        label: &str,
    ) -> Result<()> {
        let raw_id = make_id(
            &self.config.space_id,
            &entry.sys.id,
            &locale.code,
            default_locale,
            &entry.sys.sys_type,
        );
        let node_id = self.store.create_node_id(&raw_id);

        if let Some(existing) = self.store.get_node(&node_id) {
            if existing.internal.content_digest == entry.sys.updated_at {
                debug!(entry_id = %entry.sys.id, locale = %locale.code, "entry unchanged, skipping");
                return Ok(());
            }
        }

        // A field the schema does not declare means the snapshot and
        // schema are mismatched. Fatal, not droppable.
        for field_id in entry.fields.keys() {
            if schema.field(field_id).is_none() {
                return Err(NormalizeError::FieldNotInSchema {
                    content_type: schema.sys.id.clone(),
                    entry_id: entry.sys.id.clone(),
                    field: field_id.clone(),
                });
            }
        }

        let mut fields: Map<String, Value> = Map::new();
        let mut children: Vec<String> = Vec::new();

        for schema_field in &schema.fields {
            let Some(bag) = entry.fields.get(&schema_field.id) else {
                continue;
            };
            let value = if schema_field.localized {
                resolve_localized_value(bag, &locale.code, self.fallback_chain)
            } else {
                bag.get(default_locale)
            };
            let Some(value) = value else {
                continue;
            };

            let out_name = self.output_field_name(label, &schema_field.id);

            match schema_field.field_type {
                FieldType::Link => {
                    if let Some(field_value) = self.resolve_single_link(value, locale, default_locale) {
                        fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), field_value);
                    }
                }
                FieldType::LinkArray => {
                    if let Some(field_value) = self.resolve_link_array(value, locale, default_locale)
                    {
                        fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), field_value);
                    }
                }
                FieldType::Text => {
                    let child = self.emit_text_child(&node_id, type_name, &out_name, value, entry)?;
                    children.push(child.clone());
                    fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), Value::String(child));
                }
                FieldType::RichText => {
                    let child =
                        self.emit_rich_text_child(&node_id, type_name, &out_name, value, locale, default_locale)?;
                    children.push(child.clone());
                    fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), Value::String(child));
                }
                FieldType::Object => {
                    let refs =
                        self.emit_json_children(&node_id, type_name, &out_name, value, entry)?;
                    children.extend(refs.iter().cloned());
                    let field_value = match value {
                        Value::Array(_) => {
                            Value::Array(refs.into_iter().map(Value::String).collect())
                        }
                        _ => Value::String(refs.into_iter().next().unwrap_or_default()),
                    };
                    fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), field_value);
                }
                FieldType::Location => {
                    let child =
                        self.emit_location_child(&node_id, type_name, &out_name, value, entry)?;
                    children.push(child.clone());
                    fields.insert(format!("{out_name}{NODE_FIELD_MARKER}"), Value::String(child));
                }
                FieldType::Scalar => {
                    fields.insert(out_name, value.clone());
                }
            }
        }

        self.merge_reverse_references(entry, locale, default_locale, &mut fields);

        if self.config.enable_tags {
            if let Some(tags_value) = self.resolve_tags(entry, default_locale) {
                fields.insert("metadata".to_string(), tags_value);
            }
        }

        fields.insert(
            "spaceId".to_string(),
            Value::String(self.config.space_id.clone()),
        );
        fields.insert("entityId".to_string(), Value::String(entry.sys.id.clone()));
        fields.insert(
            "createdAt".to_string(),
            Value::String(entry.sys.created_at.clone()),
        );
        fields.insert(
            "updatedAt".to_string(),
            Value::String(entry.sys.updated_at.clone()),
        );
        fields.insert(
            "node_locale".to_string(),
            Value::String(locale.code.clone()),
        );

        let mut sys = Map::new();
        sys.insert("type".to_string(), Value::String(entry.sys.sys_type.clone()));
        if let Some(revision) = entry.sys.revision {
            sys.insert("revision".to_string(), json!(revision));
        }
        sys.insert(
            format!("contentType{NODE_FIELD_MARKER}"),
            Value::String(content_type_node_id.to_string()),
        );
        fields.insert("sys".to_string(), Value::Object(sys));

        let mut node = Node::new(&node_id, type_name, &entry.sys.updated_at);
        node.fields = fields;
        node.children = children;
        self.store.create_node(node)?;
        debug!(entry_id = %entry.sys.id, locale = %locale.code, "entry node emitted");
        Ok(())
    }

    /// Renames fields colliding with reserved node fields, warning once
    /// per (content type, field).
    fn output_field_name(&mut self, label: &str, field_id: &str) -> String {
        if !Node::RESERVED_FIELDS.contains(&field_id) {
            return field_id.to_string();
        }
        let renamed = format!("{}{}", self.config.conflict_field_prefix, field_id);
        if self
            .warned_conflicts
            .insert((label.to_string(), field_id.to_string()))
        {
            warn!(
                content_type = %label,
                field = %field_id,
                renamed = %renamed,
                "field id collides with a reserved node field, renaming"
            );
        }
        renamed
    }

    /// Resolves a declared single-link field. Dangling targets are
    /// dropped silently; the raw field is removed either way.
    fn resolve_single_link(
        &self,
        value: &Value,
        locale: &Locale,
        default_locale: &str,
    ) -> Option<Value> {
        let link = Link::from_value(value)?;
        self.resolved_node_id(&link, locale, default_locale)
            .map(Value::String)
    }

    /// Resolves a declared link-array field to the resolvable subset, in
    /// authored order. An empty resolvable subset yields no field at all,
    /// distinguishing "no valid links" from an authored empty list.
    fn resolve_link_array(
        &self,
        value: &Value,
        locale: &Locale,
        default_locale: &str,
    ) -> Option<Value> {
        let elements = value.as_array()?;
        let ids: Vec<Value> = elements
            .iter()
            .filter_map(Link::from_value)
            .filter_map(|link| self.resolved_node_id(&link, locale, default_locale))
            .map(Value::String)
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(Value::Array(ids))
        }
    }

    /// Node id for a link target, or `None` when the target is not in the
    /// resolvable set.
    fn resolved_node_id(
        &self,
        link: &Link,
        locale: &Locale,
        default_locale: &str,
    ) -> Option<String> {
        if !self
            .resolvable
            .contains(&entity_key(&link.id, &link.link_type))
        {
            debug!(target_id = %link.id, "dropping link to unresolvable target");
            return None;
        }
        let raw = make_id(
            &self.config.space_id,
            &link.id,
            &locale.code,
            default_locale,
            &link.link_type,
        );
        Some(self.store.create_node_id(&raw))
    }

    /// Appends precomputed reverse edges under their content-type label.
    ///
    /// Absent field → one-element list; existing list → append (many-to-one
    /// accumulation); existing non-list value → left untouched, forward
    /// resolution already owns that name.
    fn merge_reverse_references(
        &self,
        entry: &EntryRecord,
        locale: &Locale,
        default_locale: &str,
        fields: &mut Map<String, Value>,
    ) {
        let key = entity_key(&entry.sys.id, &entry.sys.sys_type);
        let Some(edges) = self.foreign_references.get(&key) else {
            return;
        };
        for edge in edges {
            let raw = make_id(
                &edge.owner_space_id,
                &edge.owner_id,
                &locale.code,
                default_locale,
                &edge.owner_type,
            );
            let referencing_id = self.store.create_node_id(&raw);
            match fields.get_mut(&edge.field_name) {
                None => {
                    fields.insert(
                        edge.field_name.clone(),
                        Value::Array(vec![Value::String(referencing_id)]),
                    );
                }
                Some(Value::Array(list)) => list.push(Value::String(referencing_id)),
                Some(_) => {}
            }
        }
    }

    /// Resolves `metadata.tags` into a tag back-reference list.
    fn resolve_tags(&self, entry: &EntryRecord, default_locale: &str) -> Option<Value> {
        let tags = &entry.metadata.as_ref()?.tags;
        if tags.is_empty() {
            return None;
        }
        let ids: Vec<Value> = tags
            .iter()
            .map(|tag| {
                let raw = make_id(
                    &self.config.space_id,
                    &tag.id,
                    default_locale,
                    default_locale,
                    &tag.link_type,
                );
                Value::String(self.store.create_node_id(&raw))
            })
            .collect();
        let mut metadata = Map::new();
        metadata.insert(format!("tags{NODE_FIELD_MARKER}"), Value::Array(ids));
        Some(Value::Object(metadata))
    }

    // ── Child node materialization ───────────────────────────────

    /// Creates a child unless a node with the same id and digest already
    /// exists. The parent re-attaches its pointer every pass either way.
    fn emit_child(&self, parent_id: &str, mut node: Node) -> Result<()> {
        if let Some(existing) = self.store.get_node(&node.id) {
            if existing.internal.content_digest == node.internal.content_digest {
                debug!(child_id = %node.id, "child unchanged, reattaching only");
                return Ok(());
            }
        }
        node.parent = Some(parent_id.to_string());
        self.store.create_node(node)
    }

    fn child_node_id(&self, parent_id: &str, field: &str, kind: &str) -> String {
        self.store
            .create_node_id(&format!("{parent_id}___{field}___{kind}"))
    }

    /// Text field → markdown child node. Non-string source collapses to
    /// an empty string, never null.
    fn emit_text_child(
        &self,
        parent_id: &str,
        type_name: &str,
        field: &str,
        value: &Value,
        entry: &EntryRecord,
    ) -> Result<String> {
        let id = self.child_node_id(parent_id, field, "TextNode");
        let text = value.as_str().unwrap_or_default().to_string();
        let mut node = Node::new(
            &id,
            &format!("{type_name}{}TextNode", pascal_case(field)),
            &entry.sys.updated_at,
        );
        node.internal.media_type = Some("text/markdown".to_string());
        node.internal.content = Some(text.clone());
        node.fields.insert("content".to_string(), Value::String(text));
        self.emit_child(parent_id, node)?;
        Ok(id)
    }

    /// Rich-text field → child node holding the serialized document plus
    /// the deduplicated, resolvable embedded references.
    ///
    /// Digest is a content hash of the serialized payload: substructure
    /// edits are not observable from the parent's `updated_at` alone.
    fn emit_rich_text_child(
        &self,
        parent_id: &str,
        type_name: &str,
        field: &str,
        value: &Value,
        locale: &Locale,
        default_locale: &str,
    ) -> Result<String> {
        let id = self.child_node_id(parent_id, field, "RichTextNode");
        let serialized = serde_json::to_string(value)?;
        let digest = self.store.create_content_digest(value);

        let mut references: Vec<Value> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        collect_embedded_links(value, &mut |link| {
            if let Some(node_id) = self.resolved_node_id(link, locale, default_locale) {
                if seen.insert(node_id.clone()) {
                    references.push(Value::String(node_id));
                }
            }
        });

        let mut node = Node::new(
            &id,
            &format!("{type_name}{}RichTextNode", pascal_case(field)),
            &digest,
        );
        node.internal.content = Some(serialized.clone());
        node.fields.insert("raw".to_string(), Value::String(serialized));
        if !references.is_empty() {
            node.fields.insert(
                format!("references{NODE_FIELD_MARKER}"),
                Value::Array(references),
            );
        }
        self.emit_child(parent_id, node)?;
        Ok(id)
    }

    /// Object field → one JSON child for a scalar value, one child per
    /// element for an array value (ids disambiguated by index).
    fn emit_json_children(
        &self,
        parent_id: &str,
        type_name: &str,
        field: &str,
        value: &Value,
        entry: &EntryRecord,
    ) -> Result<Vec<String>> {
        match value {
            Value::Array(elements) => {
                let mut ids = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    let id =
                        self.child_node_id(parent_id, field, &format!("JsonNode{index}"));
                    self.emit_json_child(parent_id, type_name, field, &id, element, entry)?;
                    ids.push(id);
                }
                Ok(ids)
            }
            _ => {
                let id = self.child_node_id(parent_id, field, "JsonNode");
                self.emit_json_child(parent_id, type_name, field, &id, value, entry)?;
                Ok(vec![id])
            }
        }
    }

    fn emit_json_child(
        &self,
        parent_id: &str,
        type_name: &str,
        field: &str,
        id: &str,
        value: &Value,
        entry: &EntryRecord,
    ) -> Result<()> {
        let mut node = Node::new(
            id,
            &format!("{type_name}{}JsonNode", pascal_case(field)),
            &entry.sys.updated_at,
        );
        node.internal.content = Some(serde_json::to_string(value)?);
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    node.fields.insert(k.clone(), v.clone());
                }
            }
            other => {
                node.fields.insert("content".to_string(), other.clone());
            }
        }
        self.emit_child(parent_id, node)
    }

    /// Location field → child node with lat/lon extracted verbatim.
    fn emit_location_child(
        &self,
        parent_id: &str,
        type_name: &str,
        field: &str,
        value: &Value,
        entry: &EntryRecord,
    ) -> Result<String> {
        let id = self.child_node_id(parent_id, field, "LocationNode");
        let mut node = Node::new(
            &id,
            &format!("{type_name}{}LocationNode", pascal_case(field)),
            &entry.sys.updated_at,
        );
        if let Some(lat) = value.get("lat") {
            node.fields.insert("lat".to_string(), lat.clone());
        }
        if let Some(lon) = value.get("lon") {
            node.fields.insert("lon".to_string(), lon.clone());
        }
        self.emit_child(parent_id, node)?;
        Ok(id)
    }
}

/// Default locale of a locale list.
pub(crate) fn default_locale(locales: &[Locale]) -> Result<&str> {
    locales
        .iter()
        .find(|l| l.is_default)
        .map(|l| l.code.as_str())
        .ok_or(NormalizeError::MissingDefaultLocale)
}

/// `"blog post"` → `"BlogPost"`; used for node type names.
pub(crate) fn pascal_case(input: &str) -> String {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Depth-first scan for embedded reference links anywhere in a rich-text
/// document. Objects that are themselves links are not descended into.
fn collect_embedded_links(value: &Value, visit: &mut impl FnMut(&Link)) {
    if let Some(link) = Link::from_value(value) {
        visit(&link);
        return;
    }
    match value {
        Value::Object(map) => {
            for v in map.values() {
                collect_embedded_links(v, visit);
            }
        }
        Value::Array(elements) => {
            for v in elements {
                collect_embedded_links(v, visit);
            }
        }
        _ => {}
    }
}
