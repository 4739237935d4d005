use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Per-locale values for one field: locale code → raw JSON value.
pub type FieldBag = HashMap<String, Value>;

/// System metadata carried by every sync record.
///
/// `created_at`/`updated_at` are the platform's ISO-8601 stamps, carried
/// verbatim as opaque strings — `updated_at` doubles as the node digest, so
/// it is compared, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    pub id: String,
    /// Record type as delivered, e.g. `"Entry"`, `"Asset"`,
    /// `"DeletedEntry"`.
    #[serde(rename = "type")]
    pub sys_type: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
    /// For entries: link to the owning content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
}

/// A reference to another entity. Serializes in the platform's wire shape
/// `{"sys": {"type": "Link", "linkType": "...", "id": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LinkWire", into = "LinkWire")]
pub struct Link {
    pub id: String,
    /// Target kind, e.g. `"Entry"`, `"Asset"`, `"Tag"`.
    pub link_type: String,
}

#[derive(Serialize, Deserialize)]
struct LinkWire {
    sys: LinkWireSys,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkWireSys {
    #[serde(rename = "type")]
    sys_type: String,
    link_type: String,
    id: String,
}

impl From<LinkWire> for Link {
    fn from(wire: LinkWire) -> Self {
        Self {
            id: wire.sys.id,
            link_type: wire.sys.link_type,
        }
    }
}

impl From<Link> for LinkWire {
    fn from(link: Link) -> Self {
        Self {
            sys: LinkWireSys {
                sys_type: "Link".to_string(),
                link_type: link.link_type,
                id: link.id,
            },
        }
    }
}

impl Link {
    pub fn new(id: &str, link_type: &str) -> Self {
        Self {
            id: id.to_string(),
            link_type: link_type.to_string(),
        }
    }

    /// Recognizes a raw JSON value as a reference.
    ///
    /// Accepts any object carrying `sys.type == "Link"` with a string
    /// `sys.id`; `sys.linkType` defaults to `"Entry"` when absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let sys = value.get("sys")?;
        if sys.get("type").and_then(Value::as_str) != Some("Link") {
            return None;
        }
        let id = sys.get("id").and_then(Value::as_str)?;
        let link_type = sys
            .get("linkType")
            .and_then(Value::as_str)
            .unwrap_or("Entry");
        Some(Self::new(id, link_type))
    }

    /// Whether a raw value is an array whose first element is a reference.
    pub fn is_reference_array(value: &Value) -> bool {
        value
            .as_array()
            .and_then(|a| a.first())
            .is_some_and(|first| Self::from_value(first).is_some())
    }
}

/// Optional record metadata; currently only platform tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tags: Vec<Link>,
}

/// A structured content record from the sync snapshot.
///
/// `fields` maps field id → locale code → raw value. Field structure is
/// described by the owning [`ContentTypeSchema`](crate::ContentTypeSchema);
/// the record itself carries no typing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub sys: Sys,
    #[serde(default)]
    pub fields: HashMap<String, FieldBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl EntryRecord {
    /// Parses an entry record from a raw sync payload.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Content-type id declared by the record, if any.
    pub fn content_type_id(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(|l| l.id.as_str())
    }
}

/// A binary-resource record (typically an image) from the sync snapshot.
///
/// Same wire shape as an entry; the well-known fields are `file`, `title`,
/// and `description`, each localized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub sys: Sys,
    #[serde(default)]
    pub fields: HashMap<String, FieldBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AssetRecord {
    /// Parses an asset record from a raw sync payload.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
