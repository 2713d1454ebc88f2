//! Block acceptance: contextual validation and insertion into the index

use super::BlockIngestionService;
use crate::domain::{
    BehaviorFlags, BlockCandidate, BlockNode, ChainIndex, IngestionError, IngestionResult,
};
use crate::metrics;
use crate::ports::{Notification, TimeSource};
use crate::state::IngestionState;
use shared_types::{DisplayHash, Hash, ZERO_HASH};
use tracing::{debug, warn};

impl BlockIngestionService {
    /// Validate a block against its parent and connect it.
    ///
    /// The parent must already be known; callers route blocks with an
    /// unknown parent to the orphan pool instead.
    pub(crate) fn maybe_accept_block(
        &self,
        state: &mut IngestionState,
        mut block: BlockCandidate,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<()> {
        let hash = block.hash();
        let parent = self.resolve_parent(&mut state.chain, &block, flags)?;

        let height = parent.as_ref().map_or(0, |p| p.height + 1);
        if !block.assign_height(height) {
            warn!(block_hash = %DisplayHash(hash).short(), "Block height was already assigned");
        }

        self.deps
            .context
            .check_block_context(&block, parent.as_ref(), flags)?;

        self.deps
            .rules
            .check_proof(&block, time_source)
            .map_err(|source| IngestionError::ProofCheckFailed {
                hash,
                source: Box::new(source),
            })?;

        self.deps.rules.populate_metadata(&mut block, parent.as_ref())?;

        if !flags.dry_run {
            self.prune_index(&mut state.chain, parent.as_ref().map(|p| &p.hash))?;
        }

        let mut node = BlockNode::new(&block, height, self.deps.rules.block_work(&block));
        if let Some(parent) = &parent {
            node.link_parent(parent);
        }
        let work_sum = node.work_sum;

        self.deps
            .selector
            .connect_best_chain(&mut state.chain, node, &block, flags)?;

        if flags.dry_run {
            debug!(block_hash = %DisplayHash(hash).short(), height, "Dry run, block would be accepted");
            return Ok(());
        }

        debug!(
            block_hash = %DisplayHash(hash).short(),
            height,
            work_sum = %work_sum,
            "Accepted block"
        );
        metrics::record_block_accepted();
        self.deps.notifier.publish(Notification::block_accepted(block));
        Ok(())
    }

    /// Parent node of `block`, `None` for genesis.
    ///
    /// A parent pruned from memory is reloaded from the store and put back
    /// into the index, except under dry-run.
    fn resolve_parent(
        &self,
        chain: &mut ChainIndex,
        block: &BlockCandidate,
        flags: BehaviorFlags,
    ) -> IngestionResult<Option<BlockNode>> {
        let parent_hash = block.parent_hash();
        if parent_hash == ZERO_HASH {
            return Ok(None);
        }
        if let Some(parent) = chain.get(&parent_hash) {
            return Ok(Some(parent.clone()));
        }

        let parent = self
            .deps
            .store
            .fetch_node(&parent_hash)?
            .ok_or(IngestionError::MissingParent(parent_hash))?;

        if !flags.dry_run {
            debug!(
                parent = %DisplayHash(parent_hash).short(),
                height = parent.height,
                "Reloaded pruned parent from the block store"
            );
            chain.insert(parent.clone());
        }
        Ok(Some(parent))
    }

    /// Evict nodes below the retention horizon that the store already holds.
    fn prune_index(&self, chain: &mut ChainIndex, keep: Option<&Hash>) -> IngestionResult<usize> {
        let mut pruned = 0;
        for hash in chain.prune_candidates(self.deps.config.min_memory_nodes) {
            if Some(&hash) == keep {
                continue;
            }
            if self.deps.store.exists_by_hash(&hash)? && chain.remove(&hash).is_some() {
                pruned += 1;
            }
        }

        if pruned > 0 {
            debug!(pruned, remaining = chain.len(), "Pruned block nodes from memory");
        }
        Ok(pruned)
    }
}
