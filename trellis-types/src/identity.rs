//! Deterministic node-id and entity-key derivation.
//!
//! Node identity is a pure function of (space id, entity id, normalized
//! type, locale, default locale). The same inputs always yield the same
//! string, which is what gives nodes a stable identity across sync passes.
//! The derived string is typically passed through an embedder's stable-id
//! generator afterwards; nothing here assumes more of that generator than
//! determinism.

/// Separator between id segments.
pub const ID_SEPARATOR: &str = "___";

/// Strips a leading `"Deleted"` prefix from a sys type, so that
/// `"DeletedEntry"` and `"Entry"` address the same entity.
pub fn normalize_type(sys_type: &str) -> &str {
    sys_type.strip_prefix("Deleted").unwrap_or(sys_type)
}

/// Derives the raw node id for an entity in a given locale.
///
/// The locale segment is appended only when `current_locale` differs from
/// `default_locale`; default-locale nodes keep the shorter three-segment
/// form so their ids are stable even if the locale list changes.
pub fn make_id(
    space_id: &str,
    entity_id: &str,
    current_locale: &str,
    default_locale: &str,
    sys_type: &str,
) -> String {
    let normalized = normalize_type(sys_type);
    if current_locale == default_locale {
        format!("{space_id}{ID_SEPARATOR}{entity_id}{ID_SEPARATOR}{normalized}")
    } else {
        format!(
            "{space_id}{ID_SEPARATOR}{entity_id}{ID_SEPARATOR}{normalized}{ID_SEPARATOR}{current_locale}"
        )
    }
}

/// Composite key addressing an entity for reference resolution:
/// `id ___ type`. Derived child nodes are never addressed this way — only
/// root-level entries and assets.
pub fn entity_key(entity_id: &str, sys_type: &str) -> String {
    format!("{entity_id}{ID_SEPARATOR}{}", normalize_type(sys_type))
}
