use serde::{Deserialize, Serialize};

/// Declared type of a content-type field.
///
/// Field handling during normalization is dispatched on this declared type,
/// never on inspection of the runtime value — the schema is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Long-form text, materialized as a markdown child node.
    Text,
    /// Structured rich-text document (object-valued).
    RichText,
    /// Free-form JSON, scalar or array.
    Object,
    /// Geographic coordinate pair.
    Location,
    /// Single reference to another entry or asset.
    Link,
    /// Ordered list of references.
    LinkArray,
    /// Any other scalar (symbol, integer, number, date, boolean).
    Scalar,
}

/// One field descriptor within a content-type schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub id: String,
    pub field_type: FieldType,
    /// Localized fields carry per-locale values and are subject to
    /// fallback resolution; non-localized fields only ever carry a value
    /// under the default locale.
    #[serde(default)]
    pub localized: bool,
}

impl SchemaField {
    pub fn new(id: &str, field_type: FieldType, localized: bool) -> Self {
        Self {
            id: id.to_string(),
            field_type,
            localized,
        }
    }
}

/// System metadata carried by a content-type schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSys {
    pub id: String,
    /// Last-modified stamp of the schema itself; used as the content-type
    /// node's digest.
    pub updated_at: String,
}

/// A content type's structure as delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSchema {
    pub sys: SchemaSys,
    /// Human-readable name, e.g. `"Blog Post"`.
    pub name: String,
    /// Field id used as the display title for entries of this type.
    pub display_field: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<SchemaField>,
}

impl ContentTypeSchema {
    /// Looks up a field descriptor by id.
    pub fn field(&self, id: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.id == id)
    }
}
