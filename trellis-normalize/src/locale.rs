//! Locale fallback chains and per-locale value resolution.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use trellis_types::{FieldBag, Locale};

/// Mapping locale code → fallback code (if any), one entry per locale.
pub type FallbackChain = HashMap<String, Option<String>>;

/// Builds the fallback chain for a locale list.
pub fn build_fallback_chain(locales: &[Locale]) -> FallbackChain {
    locales
        .iter()
        .map(|l| (l.code.clone(), l.fallback_code.clone()))
        .collect()
}

/// Resolves the value for `code` from a per-locale field bag, walking the
/// fallback chain until a value is found or the chain ends.
///
/// Chains are a forest in well-formed data; a cycle would mean malformed
/// locale metadata, so revisits terminate the walk with `None` instead of
/// looping.
pub fn resolve_localized_value<'a>(
    bag: &'a FieldBag,
    code: &str,
    chain: &FallbackChain,
) -> Option<&'a Value> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = code;
    loop {
        if let Some(value) = bag.get(current) {
            return Some(value);
        }
        if !visited.insert(current) {
            return None;
        }
        match chain.get(current) {
            Some(Some(fallback)) => current = fallback.as_str(),
            _ => return None,
        }
    }
}
