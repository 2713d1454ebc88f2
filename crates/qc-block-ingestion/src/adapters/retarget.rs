//! Bounded difficulty retargeting

use crate::domain::{easiest_target, target_to_compact, IngestionConfig};
use crate::ports::DifficultyRetarget;
use shared_types::U256;

/// Retarget model where each `max_retarget_timespan` may loosen the target
/// by at most `adjustment_factor`, never beyond the proof-of-work limit.
#[derive(Debug, Clone)]
pub struct MaxAdjustmentRetarget {
    max_retarget_timespan: u64,
    adjustment_factor: u64,
    pow_limit: U256,
}

impl MaxAdjustmentRetarget {
    pub fn new(max_retarget_timespan: u64, adjustment_factor: u64, pow_limit: U256) -> Self {
        Self {
            max_retarget_timespan,
            adjustment_factor,
            pow_limit,
        }
    }

    pub fn from_config(config: &IngestionConfig) -> Self {
        Self::new(
            config.max_retarget_timespan(),
            config.retarget_adjustment_factor,
            config.pow_limit(),
        )
    }
}

impl DifficultyRetarget for MaxAdjustmentRetarget {
    fn easiest_difficulty(&self, bits: u32, elapsed_secs: u64) -> u32 {
        target_to_compact(easiest_target(
            bits,
            elapsed_secs,
            self.max_retarget_timespan,
            self.adjustment_factor,
            self.pow_limit,
        ))
    }
}
