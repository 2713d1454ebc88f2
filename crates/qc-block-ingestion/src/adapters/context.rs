//! Contextual checks against the parent block

use crate::domain::{BehaviorFlags, BlockCandidate, BlockNode, IngestionError, IngestionResult};
use crate::ports::ContextChecker;

/// Context checker enforcing version, timestamp ordering and difficulty
/// continuity.
///
/// Timestamp and difficulty rules are skipped under `fast_add`, where the
/// caller vouches for the block.
#[derive(Debug, Clone)]
pub struct BasicContextChecker {
    min_version: u32,
    /// Require `bits` to equal the parent's. Chains with per-block
    /// retargeting disable this and plug in their own checker.
    enforce_parent_bits: bool,
}

impl BasicContextChecker {
    pub fn new(min_version: u32, enforce_parent_bits: bool) -> Self {
        Self {
            min_version,
            enforce_parent_bits,
        }
    }
}

impl Default for BasicContextChecker {
    fn default() -> Self {
        Self::new(1, true)
    }
}

impl ContextChecker for BasicContextChecker {
    fn check_block_context(
        &self,
        block: &BlockCandidate,
        parent: Option<&BlockNode>,
        flags: BehaviorFlags,
    ) -> IngestionResult<()> {
        if block.version() < self.min_version {
            return Err(IngestionError::BadVersion {
                version: block.version(),
                minimum: self.min_version,
            });
        }

        let Some(parent) = parent else {
            return Ok(());
        };
        if flags.fast_add {
            return Ok(());
        }

        if block.timestamp() <= parent.timestamp {
            return Err(IngestionError::TimeTooOld {
                timestamp: block.timestamp(),
                parent_timestamp: parent.timestamp,
            });
        }

        if self.enforce_parent_bits && block.bits() != parent.bits {
            return Err(IngestionError::UnexpectedBits {
                expected: parent.bits,
                actual: block.bits(),
            });
        }

        Ok(())
    }
}
