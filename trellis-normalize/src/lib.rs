//! Normalization engine for Trellis.
//!
//! Turns a raw sync snapshot (content-type schemas, entries, assets) into
//! an addressable, locale-aware graph of immutable nodes:
//! - [`locale`] builds fallback chains and resolves per-locale field values
//! - [`index`] builds the per-pass reference indexes (entry buckets, the
//!   resolvable set, the foreign-reference map)
//! - [`entry`] and [`asset`] assemble nodes and emit them to a [`NodeStore`]
//!
//! The engine is pure application logic without I/O: persistence, stable-id
//! generation, and content hashing sit behind the [`NodeStore`] trait. All
//! indexes are built once per sync pass and consulted read-only during
//! normalization, so content types may be processed in parallel if desired.

mod asset;
mod entry;
mod index;
mod locale;
mod store;

pub use asset::AssetNormalizer;
pub use entry::{EntryNormalizer, NormalizeConfig};
pub use index::{
    build_entry_lists, build_foreign_reference_map, build_resolvable_set, content_type_label,
    ExistingEntity, FieldLabelMode, ForeignReference, ForeignReferenceMap,
};
pub use locale::{build_fallback_chain, resolve_localized_value, FallbackChain};
pub use store::{MemoryNodeStore, NodeStore};

/// Suffix marking a field as holding resolved node references rather than
/// a raw value. Forward-resolved link fields and precomputed reverse edges
/// share the marker so same-named fields merge in the query layer.
pub const NODE_FIELD_MARKER: &str = "___NODE";

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Errors that can occur during normalization.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// A record carries a field id the content-type schema does not
    /// declare; the snapshot and schema are mismatched.
    #[error("field '{field}' on entry '{entry_id}' is not declared by content type '{content_type}'")]
    FieldNotInSchema {
        content_type: String,
        entry_id: String,
        field: String,
    },

    /// The locale list names no default locale.
    #[error("locale list contains no default locale")]
    MissingDefaultLocale,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Node store rejected an operation.
    #[error("node store error: {0}")]
    Store(String),
}
