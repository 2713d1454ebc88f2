//! Driven ports (Outbound dependencies)
//!
//! Every collaborator the pipeline consumes. All calls are synchronous and
//! run while the ingestion lock is held.

use crate::domain::{
    BehaviorFlags, BlockCandidate, BlockNode, ChainIndex, Checkpoint, IngestionResult,
};
use shared_types::{Hash, StorageError, U256};
use std::sync::Arc;

/// Persistent block store holding the main chain below the in-memory horizon.
pub trait BlockStore: Send + Sync {
    /// Check whether a block is stored durably
    fn exists_by_hash(&self, hash: &Hash) -> Result<bool, StorageError>;

    /// Load a stored node, used to re-hydrate a pruned parent
    fn fetch_node(&self, hash: &Hash) -> Result<Option<BlockNode>, StorageError>;

    /// Persist a main-chain node
    fn store_node(&self, node: &BlockNode) -> Result<(), StorageError>;
}

/// Context-free block checks: header well-formedness, proof of work,
/// transaction list, timestamp bound.
pub trait SanityChecker: Send + Sync {
    fn check_block_sanity(
        &self,
        block: &BlockCandidate,
        pow_limit: U256,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<()>;
}

/// Checks that depend on the block's position in the chain.
pub trait ContextChecker: Send + Sync {
    /// `parent` is `None` for genesis
    fn check_block_context(
        &self,
        block: &BlockCandidate,
        parent: Option<&BlockNode>,
        flags: BehaviorFlags,
    ) -> IngestionResult<()>;
}

/// Chain-specific hooks interleaved into the generic pipeline.
///
/// Keeps stake and weight policy out of the orchestration code. Only the
/// consensus proof, metadata and work hooks are mandatory.
pub trait ChainRules: Send + Sync {
    /// Runs before any sanity check
    fn pre_sanity(&self, _block: &BlockCandidate) -> IngestionResult<()> {
        Ok(())
    }

    /// Runs before a block is placed in the orphan pool
    fn on_orphan_added(&self, _block: &BlockCandidate) -> IngestionResult<()> {
        Ok(())
    }

    /// Runs after a block leaves the orphan pool, for any reason
    fn on_orphan_removed(&self, _block: &BlockCandidate) {}

    /// Consensus proof (stake kernel, signatures) validation
    fn check_proof(&self, block: &BlockCandidate, time_source: &dyn TimeSource)
        -> IngestionResult<()>;

    /// Fill in `block.meta` before the node is built
    fn populate_metadata(
        &self,
        block: &mut BlockCandidate,
        parent: Option<&BlockNode>,
    ) -> IngestionResult<()>;

    /// This block's own contribution to cumulative work
    fn block_work(&self, block: &BlockCandidate) -> U256;
}

/// Best-chain selection.
///
/// Owns insertion of the new node into the index, main-chain updates and
/// reorganization. Must not leave a dangling best tip on failure.
pub trait ChainSelector: Send + Sync {
    fn connect_best_chain(
        &self,
        index: &mut ChainIndex,
        node: BlockNode,
        block: &BlockCandidate,
        flags: BehaviorFlags,
    ) -> IngestionResult<()>;
}

/// Locates the most recent checkpoint at or below the current chain position.
pub trait CheckpointLocator: Send + Sync {
    fn find_previous_checkpoint(&self, index: &ChainIndex) -> IngestionResult<Option<Checkpoint>>;
}

/// Minimum-difficulty derivation used by the checkpoint gate.
pub trait DifficultyRetarget: Send + Sync {
    /// Easiest compact target reachable from `bits` after `elapsed_secs`
    fn easiest_difficulty(&self, bits: u32, elapsed_secs: u64) -> u32;
}

/// Time source for timestamp validation
pub trait TimeSource: Send + Sync {
    /// Network-adjusted unix time in seconds
    fn adjusted_time(&self) -> u64;
}

/// Kinds of event the pipeline publishes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A block was accepted into the chain index
    BlockAccepted,
}

/// Event published to peers and miners.
#[derive(Clone, Debug)]
pub struct Notification {
    pub kind: NotificationKind,
    pub block: Arc<BlockCandidate>,
}

impl Notification {
    pub fn block_accepted(block: BlockCandidate) -> Self {
        Self {
            kind: NotificationKind::BlockAccepted,
            block: Arc::new(block),
        }
    }
}

/// Fire-and-forget notification delivery.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification);
}
