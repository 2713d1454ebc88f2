//! Block replay
//!
//! Feeds a JSON file of blocks through the pipeline in file order. Used by
//! the `qc-ingest` binary to reproduce ingestion runs offline.
//!
//! ```json
//! {
//!   "checkpoints": [{ "height": 0, "hash": "ab..", "timestamp": 0, "bits": 545259519 }],
//!   "time_samples": [{ "source": "10.0.0.1:8333", "time": 1700000000 }],
//!   "blocks": [{ "header": { .. }, "transactions": [ .. ] }]
//! }
//! ```
//!
//! `time_samples` are peer-reported clocks; the replay runs on the local
//! clock corrected by their median offset.

use crate::adapters::MedianTimeSource;
use crate::domain::{BehaviorFlags, BlockCandidate, Checkpoint};
use crate::ports::TimeSource;
use crate::service::BlockIngestionService;
use serde::{Deserialize, Serialize};
use shared_types::{DisplayHash, Hash};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Replay errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed replay file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Contents of a replay file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplayFile {
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    #[serde(default)]
    pub time_samples: Vec<TimeSample>,
    pub blocks: Vec<BlockCandidate>,
}

/// A clock reading reported by a peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSample {
    pub source: String,
    /// Unix seconds
    pub time: u64,
}

impl ReplayFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Network-adjusted clock over `local`, seeded with peer samples.
pub fn network_clock(local: Arc<dyn TimeSource>, samples: &[TimeSample]) -> MedianTimeSource {
    let clock = MedianTimeSource::new(local);
    for sample in samples {
        clock.add_time_sample(&sample.source, sample.time);
    }
    clock
}

/// Outcome of a replay run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub accepted: usize,
    pub orphaned: usize,
    /// Rejected blocks with the rendered error
    pub rejected: Vec<(Hash, String)>,
}

/// Process every block in order. Rejections are recorded, not fatal.
pub fn replay_blocks(
    service: &BlockIngestionService,
    blocks: Vec<BlockCandidate>,
    time_source: &dyn TimeSource,
    flags: BehaviorFlags,
) -> ReplayReport {
    let mut report = ReplayReport::default();

    for block in blocks {
        let hash = block.hash();
        match service.process_block(block, time_source, flags) {
            Ok(true) => report.orphaned += 1,
            Ok(false) => report.accepted += 1,
            Err(e) => {
                if e.is_rule_violation() {
                    debug!(block_hash = %DisplayHash(hash).short(), error = %e, "Replay rejected block");
                } else {
                    warn!(block_hash = %DisplayHash(hash).short(), error = %e, "Replay hit an infrastructure error");
                }
                report.rejected.push((hash, e.to_string()));
            }
        }
    }

    report
}
