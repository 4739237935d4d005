//! The node persistence/lookup collaborator.

use crate::{NormalizeError, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use trellis_types::Node;

/// Persistence, stable-id generation, and content hashing, as seen by the
/// normalization engine.
///
/// `get_node` is the single source of truth for prior state: the
/// digest-skip rule is an interface query against the store, never cache
/// state held inside the engine. `create_node_id` must be deterministic
/// and injective over distinct raw keys for a given run; nothing else is
/// assumed about the ids it mints.
pub trait NodeStore: Send + Sync {
    fn get_node(&self, id: &str) -> Option<Node>;
    fn create_node(&self, node: Node) -> Result<()>;
    fn create_node_id(&self, raw: &str) -> String;
    /// Content hash, used only where the parent `updated_at` is an
    /// insufficient digest (rich text).
    fn create_content_digest(&self, payload: &Value) -> String;
}

/// In-memory [`NodeStore`] for tests and embedding.
///
/// Ids are minted by identity (the raw key is already deterministic and
/// unique); digests are hex-encoded SHA-256 of the serialized payload.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: Mutex<HashMap<String, Node>>,
    writes: AtomicUsize,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.lock().expect("node map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `create_node` calls, including overwrites. Lets tests tell a
    /// digest-skip apart from a rewrite of identical content.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// All stored node ids, unordered.
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes
            .lock()
            .expect("node map poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl NodeStore for MemoryNodeStore {
    fn get_node(&self, id: &str) -> Option<Node> {
        self.nodes.lock().expect("node map poisoned").get(id).cloned()
    }

    fn create_node(&self, node: Node) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.nodes
            .lock()
            .expect("node map poisoned")
            .insert(node.id.clone(), node);
        Ok(())
    }

    fn create_node_id(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn create_content_digest(&self, payload: &Value) -> String {
        let serialized = serde_json::to_vec(payload).unwrap_or_default();
        hex::encode(Sha256::digest(&serialized))
    }
}

impl NormalizeError {
    /// Convenience for store implementations wrapping their own failures.
    pub fn store(message: impl Into<String>) -> Self {
        NormalizeError::Store(message.into())
    }
}
