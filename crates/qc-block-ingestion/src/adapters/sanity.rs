//! Context-free sanity checks

use crate::domain::{
    compact_to_target, compute_merkle_root, hash_to_u256, BehaviorFlags, BlockCandidate,
    IngestionError, IngestionResult,
};
use crate::ports::{SanityChecker, TimeSource};
use shared_types::U256;
use std::collections::HashSet;

/// Sanity checker covering header, proof of work, transactions and
/// timestamp drift.
#[derive(Debug, Clone)]
pub struct BasicSanityChecker {
    max_future_block_secs: u64,
}

impl BasicSanityChecker {
    pub fn new(max_future_block_secs: u64) -> Self {
        Self {
            max_future_block_secs,
        }
    }

    fn check_proof_of_work(
        &self,
        block: &BlockCandidate,
        pow_limit: U256,
        flags: BehaviorFlags,
    ) -> IngestionResult<()> {
        let bits = block.bits();
        let target = compact_to_target(bits).ok_or(IngestionError::BadDifficultyBits(bits))?;
        if target.is_zero() {
            return Err(IngestionError::BadDifficultyBits(bits));
        }
        if target > pow_limit {
            return Err(IngestionError::UnexpectedDifficulty {
                target,
                limit: pow_limit,
            });
        }

        if !flags.no_pow_check && hash_to_u256(&block.hash()) > target {
            return Err(IngestionError::HighHash { hash: block.hash() });
        }
        Ok(())
    }

    fn check_transactions(&self, block: &BlockCandidate) -> IngestionResult<()> {
        if block.transactions.is_empty() {
            return Err(IngestionError::NoTransactions);
        }

        let mut seen = HashSet::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let hash = tx.hash();
            if !seen.insert(hash) {
                return Err(IngestionError::DuplicateTransaction(hash));
            }
        }

        let computed = compute_merkle_root(&block.transactions);
        if computed != block.merkle_root() {
            return Err(IngestionError::BadMerkleRoot {
                header: block.merkle_root(),
                computed,
            });
        }
        Ok(())
    }
}

impl Default for BasicSanityChecker {
    fn default() -> Self {
        Self::new(2 * 60 * 60)
    }
}

impl SanityChecker for BasicSanityChecker {
    fn check_block_sanity(
        &self,
        block: &BlockCandidate,
        pow_limit: U256,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<()> {
        if block.version() == 0 {
            return Err(IngestionError::BadHeader("version 0 is reserved".into()));
        }

        self.check_proof_of_work(block, pow_limit, flags)?;

        let max_allowed = time_source
            .adjusted_time()
            .saturating_add(self.max_future_block_secs);
        if block.timestamp() > max_allowed {
            return Err(IngestionError::TimeTooNew {
                timestamp: block.timestamp(),
                max_allowed,
            });
        }

        self.check_transactions(block)
    }
}
