use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Engine-internal bookkeeping attached to every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInternal {
    /// Node type name exposed to the query layer, e.g. `"BlogPost"`,
    /// `"Asset"`, `"BlogPostBodyTextNode"`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Change-detection stamp. For most nodes this is the source record's
    /// `updated_at`; rich-text children use a content hash instead. A
    /// digest match is the sole criterion for skipping recomputation.
    pub content_digest: String,
    /// Serialized payload retained for child nodes that wrap raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Media type hint for text children (`"text/markdown"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// The normalized output unit emitted to the node store.
///
/// Domain fields live in `fields` as raw JSON, the node id is derived by
/// [`make_id`](crate::make_id), and `parent`/`children` wire derived child
/// nodes to their owning entry. Nodes are immutable once created for a
/// given digest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    pub internal: NodeInternal,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Node {
    /// Creates a node with the given identity and digest and no fields.
    pub fn new(id: &str, type_name: &str, content_digest: &str) -> Self {
        Self {
            id: id.to_string(),
            parent: None,
            children: Vec::new(),
            internal: NodeInternal {
                type_name: type_name.to_string(),
                content_digest: content_digest.to_string(),
                content: None,
                media_type: None,
            },
            fields: Map::new(),
        }
    }

    /// Reads a domain field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Reads a string-valued domain field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Field names that are part of the node shape itself and must not be
    /// shadowed by source fields; colliding source fields are renamed with
    /// the configured conflict prefix.
    pub const RESERVED_FIELDS: &'static [&'static str] =
        &["id", "parent", "children", "internal", "fields", "sys"];
}
