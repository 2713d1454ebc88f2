//! Most-work chain selection

use crate::domain::{
    BehaviorFlags, BlockCandidate, BlockNode, ChainIndex, IngestionError, IngestionResult,
};
use crate::ports::{BlockStore, ChainSelector};
use shared_types::{DisplayHash, Hash};
use std::sync::Arc;
use tracing::{debug, info};

/// Chain selector that follows the branch with the greatest cumulative work.
///
/// Every connected node goes into the index. When a node overtakes the
/// current best tip, the segment back to the first already-stored ancestor
/// is persisted before the tip moves, so a storage failure leaves the
/// previous best tip in place. Ties keep the incumbent.
pub struct MostWorkChainSelector {
    store: Arc<dyn BlockStore>,
}

impl MostWorkChainSelector {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self { store }
    }

    fn persist_branch(&self, index: &ChainIndex, tip: &Hash) -> IngestionResult<usize> {
        let mut unstored = Vec::new();
        for node in index.ancestors(tip) {
            if self.store.exists_by_hash(&node.hash)? {
                break;
            }
            unstored.push(node.clone());
        }

        for node in unstored.iter().rev() {
            self.store.store_node(node)?;
        }
        Ok(unstored.len())
    }
}

impl ChainSelector for MostWorkChainSelector {
    fn connect_best_chain(
        &self,
        index: &mut ChainIndex,
        node: BlockNode,
        _block: &BlockCandidate,
        flags: BehaviorFlags,
    ) -> IngestionResult<()> {
        let previous_best = index.best_tip().map(|best| (best.hash, best.work_sum));
        let becomes_best = previous_best.map_or(true, |(_, work)| node.work_sum > work);

        if flags.dry_run {
            debug!(
                block_hash = %DisplayHash(node.hash).short(),
                becomes_best,
                "Dry run, chain selection evaluated only"
            );
            return Ok(());
        }

        if let Some(parent) = node.parent {
            if !index.contains(&parent) {
                return Err(IngestionError::ChainSelection(format!(
                    "parent {} of {} is not in the chain index",
                    DisplayHash(parent),
                    DisplayHash(node.hash)
                )));
            }
        }

        let hash = node.hash;
        let height = node.height;
        let parent = node.parent;
        index.insert(node);

        if !becomes_best {
            debug!(
                block_hash = %DisplayHash(hash).short(),
                height,
                "Block extends a side chain"
            );
            return Ok(());
        }

        let persisted = self.persist_branch(index, &hash)?;
        if let Some((old_best, _)) = previous_best {
            if parent != Some(old_best) {
                info!(
                    old_tip = %DisplayHash(old_best).short(),
                    new_tip = %DisplayHash(hash).short(),
                    height,
                    persisted,
                    "Reorganizing to a chain with more work"
                );
            }
        }

        index.set_best_tip(hash);
        Ok(())
    }
}
