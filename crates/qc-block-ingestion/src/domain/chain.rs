//! In-memory chain index
//!
//! Arena of [`BlockNode`]s keyed by hash. Holds the main chain and every
//! live side chain down to the retention horizon; older main-chain blocks
//! live only in the persistent store.

use super::BlockNode;
use shared_types::Hash;
use std::collections::HashMap;

/// Hash-addressed arena of known block nodes plus the current best tip.
#[derive(Debug, Default)]
pub struct ChainIndex {
    nodes: HashMap<Hash, BlockNode>,
    best_tip: Option<Hash>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a block hash is held in memory
    pub fn contains(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&BlockNode> {
        self.nodes.get(hash)
    }

    /// Insert a node, replacing any node with the same hash.
    pub fn insert(&mut self, node: BlockNode) {
        self.nodes.insert(node.hash, node);
    }

    /// Remove a node. The best tip cannot be removed.
    pub fn remove(&mut self, hash: &Hash) -> Option<BlockNode> {
        if self.best_tip.as_ref() == Some(hash) {
            return None;
        }
        self.nodes.remove(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn best_tip(&self) -> Option<&BlockNode> {
        self.best_tip.as_ref().and_then(|hash| self.nodes.get(hash))
    }

    /// Height of the best tip, `None` while the index is empty
    pub fn best_height(&self) -> Option<u64> {
        self.best_tip().map(|node| node.height)
    }

    /// Point the best tip at a node already held in the index.
    ///
    /// Returns `false` if the node is unknown.
    pub fn set_best_tip(&mut self, hash: Hash) -> bool {
        if !self.nodes.contains_key(&hash) {
            return false;
        }
        self.best_tip = Some(hash);
        true
    }

    /// Nodes that have fallen more than `min_memory_nodes` below the best tip.
    ///
    /// The best tip itself is never returned.
    pub fn prune_candidates(&self, min_memory_nodes: u64) -> Vec<Hash> {
        let Some(best_height) = self.best_height() else {
            return Vec::new();
        };
        let Some(horizon) = best_height.checked_sub(min_memory_nodes) else {
            return Vec::new();
        };

        self.nodes
            .values()
            .filter(|node| node.height < horizon && Some(node.hash) != self.best_tip)
            .map(|node| node.hash)
            .collect()
    }

    /// Walk parent links from `hash` towards genesis, stopping at the first
    /// ancestor that is no longer held in memory.
    pub fn ancestors(&self, hash: &Hash) -> Vec<&BlockNode> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(hash);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.as_ref().and_then(|parent| self.nodes.get(parent));
        }
        path
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockNode> {
        self.nodes.values()
    }
}
