//! Block nodes: accepted blocks as positioned in the chain graph

use super::{BlockCandidate, BlockMeta};
use shared_types::{Hash, U256};

/// In-memory record of an accepted block.
///
/// Parent relationships are stored as hashes into the [`ChainIndex`]
/// arena rather than as owning pointers.
///
/// [`ChainIndex`]: super::ChainIndex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockNode {
    pub hash: Hash,
    pub height: u64,
    /// `None` only for genesis
    pub parent: Option<Hash>,
    /// Cumulative work from genesis up to and including this block
    pub work_sum: U256,
    pub timestamp: u64,
    pub bits: u32,
    pub meta: BlockMeta,
}

impl BlockNode {
    /// Build an unlinked node whose work sum is this block's own contribution.
    pub fn new(block: &BlockCandidate, height: u64, own_work: U256) -> Self {
        Self {
            hash: block.hash(),
            height,
            parent: None,
            work_sum: own_work,
            timestamp: block.timestamp(),
            bits: block.bits(),
            meta: block.meta.clone(),
        }
    }

    /// Link to the parent node and accumulate its work.
    pub fn link_parent(&mut self, parent: &BlockNode) {
        self.parent = Some(parent.hash);
        self.height = parent.height + 1;
        self.work_sum = parent.work_sum.saturating_add(self.work_sum);
    }

    pub fn is_genesis(&self) -> bool {
        self.parent.is_none()
    }
}
