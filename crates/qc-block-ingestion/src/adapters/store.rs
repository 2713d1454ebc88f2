//! In-memory block store adapter

use crate::domain::BlockNode;
use crate::ports::BlockStore;
use parking_lot::RwLock;
use shared_types::{Hash, StorageError};
use std::collections::HashMap;

/// Block store backed by a hash map, for tests and the replay tool.
#[derive(Default)]
pub struct InMemoryBlockStore {
    nodes: RwLock<HashMap<Hash, BlockNode>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn exists_by_hash(&self, hash: &Hash) -> Result<bool, StorageError> {
        Ok(self.nodes.read().contains_key(hash))
    }

    fn fetch_node(&self, hash: &Hash) -> Result<Option<BlockNode>, StorageError> {
        Ok(self.nodes.read().get(hash).cloned())
    }

    fn store_node(&self, node: &BlockNode) -> Result<(), StorageError> {
        self.nodes.write().insert(node.hash, node.clone());
        Ok(())
    }
}
