//! Ingestion configuration
//!
//! Plain struct with defaults, overridable from `QC_*` environment variables.

use super::{compact_to_target, CheckpointGateConfig, OrphanPoolConfig};
use shared_types::U256;
use std::env;

/// Configuration for the ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Orphan pool bounds
    pub orphans: OrphanPoolConfig,
    /// Checkpoint gate policy
    pub checkpoints: CheckpointGateConfig,
    /// Blocks kept in memory below the best tip before pruning (default: 2016)
    pub min_memory_nodes: u64,
    /// Easiest allowed target, compact form (default: 0x1d00ffff)
    pub pow_limit_bits: u32,
    /// How far ahead of adjusted time a block timestamp may be (default: 2h)
    pub max_future_block_secs: u64,
    /// Nominal retarget period (default: 14 days)
    pub target_timespan_secs: u64,
    /// Maximum target loosening per period (default: 4)
    pub retarget_adjustment_factor: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            orphans: OrphanPoolConfig::default(),
            checkpoints: CheckpointGateConfig::default(),
            min_memory_nodes: 2016,
            pow_limit_bits: 0x1d00_ffff,
            max_future_block_secs: 2 * 60 * 60,
            target_timespan_secs: 14 * 24 * 60 * 60,
            retarget_adjustment_factor: 4,
        }
    }
}

impl IngestionConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_MAX_ORPHANS`: Orphan pool capacity (default: 100)
    /// - `QC_ORPHAN_TTL_SECS`: Orphan expiry (default: 3600)
    /// - `QC_MIN_MEMORY_NODES`: Retention horizon (default: 2016)
    /// - `QC_POW_LIMIT_BITS`: Easiest target, hex or decimal (default: 0x1d00ffff)
    /// - `QC_MAX_FUTURE_BLOCK_SECS`: Timestamp drift (default: 7200)
    /// - `QC_TARGET_TIMESPAN_SECS`: Retarget period (default: 1209600)
    /// - `QC_RETARGET_ADJUSTMENT_FACTOR`: Per-period factor (default: 4)
    /// - `QC_ENFORCE_CHECKPOINT_DIFFICULTY`: Minimum-difficulty bound (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            orphans: OrphanPoolConfig {
                max_orphans: parse_env("QC_MAX_ORPHANS").unwrap_or(defaults.orphans.max_orphans),
                orphan_ttl_secs: parse_env("QC_ORPHAN_TTL_SECS")
                    .unwrap_or(defaults.orphans.orphan_ttl_secs),
            },
            checkpoints: CheckpointGateConfig {
                enforce_min_difficulty: env::var("QC_ENFORCE_CHECKPOINT_DIFFICULTY")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(defaults.checkpoints.enforce_min_difficulty),
            },
            min_memory_nodes: parse_env("QC_MIN_MEMORY_NODES")
                .unwrap_or(defaults.min_memory_nodes),
            pow_limit_bits: env::var("QC_POW_LIMIT_BITS")
                .ok()
                .and_then(|v| parse_bits(&v))
                .unwrap_or(defaults.pow_limit_bits),
            max_future_block_secs: parse_env("QC_MAX_FUTURE_BLOCK_SECS")
                .unwrap_or(defaults.max_future_block_secs),
            target_timespan_secs: parse_env("QC_TARGET_TIMESPAN_SECS")
                .unwrap_or(defaults.target_timespan_secs),
            retarget_adjustment_factor: parse_env("QC_RETARGET_ADJUSTMENT_FACTOR")
                .unwrap_or(defaults.retarget_adjustment_factor),
        }
    }

    /// The proof-of-work limit as a full target.
    pub fn pow_limit(&self) -> U256 {
        compact_to_target(self.pow_limit_bits).unwrap_or_default()
    }

    /// Longest span over which the target may loosen by one adjustment factor.
    pub fn max_retarget_timespan(&self) -> u64 {
        self.target_timespan_secs
            .saturating_mul(self.retarget_adjustment_factor)
    }

    /// Validate configuration values.
    ///
    /// Returns `true` if all values are within acceptable bounds.
    pub fn is_valid(&self) -> bool {
        self.orphans.is_valid()
            && self.min_memory_nodes > 0
            && !self.pow_limit().is_zero()
            && self.target_timespan_secs > 0
            && self.retarget_adjustment_factor >= 1
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_bits(value: &str) -> Option<u32> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
