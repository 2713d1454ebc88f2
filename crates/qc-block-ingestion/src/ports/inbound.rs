//! Driving ports (Inbound API)

use super::TimeSource;
use crate::domain::{BehaviorFlags, BlockCandidate, IngestionResult};
use shared_types::Hash;

/// Primary block ingestion API
pub trait BlockIngestionApi: Send + Sync {
    /// Process a block received from the network.
    ///
    /// Returns `Ok(true)` if the block was parked as an orphan, `Ok(false)`
    /// if it was accepted (or, under dry-run, would have been). The flag is
    /// only meaningful when no error is returned.
    fn process_block(
        &self,
        block: BlockCandidate,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<bool>;

    /// Check whether a block is known to the chain, in memory or on disk
    fn block_exists(&self, hash: &Hash) -> IngestionResult<bool>;

    /// First missing ancestor of an orphan, the block to request from peers
    fn orphan_root(&self, hash: &Hash) -> Hash;
}
