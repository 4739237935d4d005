//! Core type definitions for Trellis.
//!
//! This crate defines the fundamental, platform-facing types used throughout
//! the normalization engine:
//! - Locales and fallback metadata
//! - Content-type schemas with typed field descriptors
//! - Entry and asset sync records (fields held as raw JSON per locale)
//! - The `Node` output shape emitted to the node store
//! - The deterministic identity scheme (node ids and entity keys)
//!
//! Normalization logic (locale resolution, reference indexing, node
//! assembly) lives in `trellis-normalize`, not here.

mod identity;
mod locale;
mod node;
mod record;
mod schema;

pub use identity::{entity_key, make_id, normalize_type, ID_SEPARATOR};
pub use locale::Locale;
pub use node::{Node, NodeInternal};
pub use record::{AssetRecord, EntryRecord, FieldBag, Link, Metadata, Sys};
pub use schema::{ContentTypeSchema, FieldType, SchemaField, SchemaSys};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
