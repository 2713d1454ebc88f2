//! Proof-of-work chain rules

use crate::domain::{calc_work, BlockCandidate, BlockNode, IngestionResult};
use crate::ports::{ChainRules, TimeSource};
use shared_types::U256;

/// Chain rules for a pure proof-of-work chain.
///
/// There is no stake proof to verify; metadata carries the parent's stake
/// modifier forward and derives the entropy bit from the block hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofOfWorkRules;

impl ChainRules for ProofOfWorkRules {
    fn check_proof(&self, _block: &BlockCandidate, _time: &dyn TimeSource) -> IngestionResult<()> {
        Ok(())
    }

    fn populate_metadata(
        &self,
        block: &mut BlockCandidate,
        parent: Option<&BlockNode>,
    ) -> IngestionResult<()> {
        let hash = block.hash();
        block.meta.is_proof_of_stake = false;
        block.meta.stake_modifier = parent.map_or(0, |p| p.meta.stake_modifier);
        block.meta.entropy_bit = hash[31] & 1 == 1;
        Ok(())
    }

    fn block_work(&self, block: &BlockCandidate) -> U256 {
        calc_work(block.bits())
    }
}
