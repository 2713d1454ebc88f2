//! # Checkpoint Gate
//!
//! Context-free policy anchored to the most recent hard checkpoint.
//!
//! ## Threat: Cheap Deep Side Chains
//!
//! Without an anchor, an attacker can mine long side chains forking far
//! below the current tip at whatever difficulty was valid back then, and
//! make every node store and validate them.
//!
//! ## Rules
//!
//! 1. A block may not claim a timestamp before the last checkpoint.
//! 2. Unless the block is being fast-added, its claimed target may not be
//!    easier than the easiest target reachable from the checkpoint's
//!    difficulty in the time elapsed since, under the maximum per-period
//!    retarget adjustment.

use super::{compact_to_target, BehaviorFlags, BlockCandidate, IngestionError, IngestionResult};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::Hash;

/// A network-agreed checkpoint block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub height: u64,
    #[serde_as(as = "Hex")]
    pub hash: Hash,
    pub timestamp: u64,
    /// Compact difficulty of the checkpoint block
    pub bits: u32,
}

impl Checkpoint {
    pub fn new(height: u64, hash: Hash, timestamp: u64, bits: u32) -> Self {
        Self {
            height,
            hash,
            timestamp,
            bits,
        }
    }
}

/// Checkpoint gate configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointGateConfig {
    /// Enforce the minimum-difficulty bound. Networks whose difficulty is
    /// not derived from elapsed time (e.g. stake-weighted targets) turn
    /// this off and keep only the timestamp rule.
    pub enforce_min_difficulty: bool,
}

impl Default for CheckpointGateConfig {
    fn default() -> Self {
        Self {
            enforce_min_difficulty: true,
        }
    }
}

/// Checkpoint gate.
#[derive(Debug, Clone, Default)]
pub struct CheckpointGate {
    config: CheckpointGateConfig,
}

impl CheckpointGate {
    pub fn new(config: CheckpointGateConfig) -> Self {
        Self { config }
    }

    /// Check a block against the latest checkpoint.
    ///
    /// `easiest_bits(checkpoint_bits, elapsed_secs)` yields the easiest
    /// compact target allowed after `elapsed_secs`.
    ///
    /// Returns `Ok(())` if:
    /// - no checkpoint is known yet
    /// - the block is not older than the checkpoint and its target is at
    ///   least as hard as the derived minimum
    pub fn check<F>(
        &self,
        block: &BlockCandidate,
        checkpoint: Option<&Checkpoint>,
        flags: BehaviorFlags,
        easiest_bits: F,
    ) -> IngestionResult<()>
    where
        F: FnOnce(u32, u64) -> u32,
    {
        let Some(checkpoint) = checkpoint else {
            return Ok(());
        };

        let timestamp = block.timestamp();
        if timestamp < checkpoint.timestamp {
            return Err(IngestionError::CheckpointTimeTooOld {
                hash: block.hash(),
                timestamp,
                checkpoint_timestamp: checkpoint.timestamp,
            });
        }

        if flags.fast_add || !self.config.enforce_min_difficulty {
            return Ok(());
        }

        let elapsed = timestamp - checkpoint.timestamp;
        let required_bits = easiest_bits(checkpoint.bits, elapsed);
        let required = compact_to_target(required_bits)
            .ok_or(IngestionError::BadDifficultyBits(required_bits))?;
        let target = compact_to_target(block.bits())
            .ok_or(IngestionError::BadDifficultyBits(block.bits()))?;

        if target > required {
            return Err(IngestionError::DifficultyTooLow { target, required });
        }

        Ok(())
    }
}
