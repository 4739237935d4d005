//! Asset normalization: one node per asset per locale, no child splitting.

use crate::entry::default_locale;
use crate::locale::{resolve_localized_value, FallbackChain};
use crate::store::NodeStore;
use crate::{NormalizeConfig, Result};
use serde_json::{json, Map, Value};
use tracing::debug;
use trellis_types::{make_id, AssetRecord, Locale, Node};

/// Normalizes asset records into asset nodes.
pub struct AssetNormalizer<'a> {
    config: &'a NormalizeConfig,
    store: &'a dyn NodeStore,
    fallback_chain: &'a FallbackChain,
}

impl<'a> AssetNormalizer<'a> {
    pub fn new(
        config: &'a NormalizeConfig,
        store: &'a dyn NodeStore,
        fallback_chain: &'a FallbackChain,
    ) -> Self {
        Self {
            config,
            store,
            fallback_chain,
        }
    }

    /// Normalizes all assets across all locales. Unchanged assets
    /// (matching digest in the store) are skipped.
    pub fn normalize_assets(&self, assets: &[AssetRecord], locales: &[Locale]) -> Result<()> {
        let default = default_locale(locales)?;
        for locale in locales {
            for asset in assets {
                self.normalize_asset(asset, locale, default)?;
            }
        }
        Ok(())
    }

    fn normalize_asset(&self, asset: &AssetRecord, locale: &Locale, default: &str) -> Result<()> {
        let raw_id = make_id(
            &self.config.space_id,
            &asset.sys.id,
            &locale.code,
            default,
            &asset.sys.sys_type,
        );
        let node_id = self.store.create_node_id(&raw_id);

        if let Some(existing) = self.store.get_node(&node_id) {
            if existing.internal.content_digest == asset.sys.updated_at {
                debug!(asset_id = %asset.sys.id, locale = %locale.code, "asset unchanged, skipping");
                return Ok(());
            }
        }

        let mut fields: Map<String, Value> = Map::new();
        fields.insert(
            "title".to_string(),
            Value::String(self.localized_str(asset, "title", locale)),
        );
        fields.insert(
            "description".to_string(),
            Value::String(self.localized_str(asset, "description", locale)),
        );
        if let Some(file) = self.localized_value(asset, "file", locale) {
            fields.insert("file".to_string(), file.clone());
        }

        fields.insert(
            "spaceId".to_string(),
            Value::String(self.config.space_id.clone()),
        );
        fields.insert("entityId".to_string(), Value::String(asset.sys.id.clone()));
        fields.insert(
            "createdAt".to_string(),
            Value::String(asset.sys.created_at.clone()),
        );
        fields.insert(
            "updatedAt".to_string(),
            Value::String(asset.sys.updated_at.clone()),
        );
        fields.insert(
            "node_locale".to_string(),
            Value::String(locale.code.clone()),
        );

        let mut sys = Map::new();
        sys.insert("type".to_string(), Value::String(asset.sys.sys_type.clone()));
        if let Some(revision) = asset.sys.revision {
            sys.insert("revision".to_string(), json!(revision));
        }
        fields.insert("sys".to_string(), Value::Object(sys));

        let mut node = Node::new(&node_id, "Asset", &asset.sys.updated_at);
        node.fields = fields;
        self.store.create_node(node)?;
        debug!(asset_id = %asset.sys.id, locale = %locale.code, "asset node emitted");
        Ok(())
    }

    fn localized_value<'v>(
        &self,
        asset: &'v AssetRecord,
        field: &str,
        locale: &Locale,
    ) -> Option<&'v Value> {
        asset
            .fields
            .get(field)
            .and_then(|bag| resolve_localized_value(bag, &locale.code, self.fallback_chain))
    }

    /// Localized string field, defaulting to empty rather than absent.
    fn localized_str(&self, asset: &AssetRecord, field: &str, locale: &Locale) -> String {
        self.localized_value(asset, field, locale)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}
