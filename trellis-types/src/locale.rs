use serde::{Deserialize, Serialize};

/// A locale advertised by the content platform.
///
/// Fallback chains form a forest: each locale names at most one fallback
/// locale. The platform never produces cycles; the resolver in
/// `trellis-normalize` still terminates if one appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    /// BCP-47 style locale code, e.g. `"en-US"`.
    pub code: String,
    /// Locale to consult when this locale has no value for a field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_code: Option<String>,
    /// Whether this is the space's default locale.
    #[serde(default)]
    pub is_default: bool,
}

impl Locale {
    /// Shorthand for a locale with no fallback.
    pub fn new(code: &str, is_default: bool) -> Self {
        Self {
            code: code.to_string(),
            fallback_code: None,
            is_default,
        }
    }

    /// Shorthand for a locale that falls back to another.
    pub fn with_fallback(code: &str, fallback: &str) -> Self {
        Self {
            code: code.to_string(),
            fallback_code: Some(fallback.to_string()),
            is_default: false,
        }
    }
}
