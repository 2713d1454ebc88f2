//! # Ingestion Metrics
//!
//! Prometheus metrics for monitoring the block pipeline.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-block-ingestion = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ingestion_blocks_accepted_total` - Blocks accepted into the chain index
//! - `ingestion_blocks_rejected_total` - Rejected blocks, by reason
//! - `ingestion_orphans_added_total` - Blocks parked in the orphan pool
//! - `ingestion_orphans_evicted_total` - Orphans dropped by expiry or capacity
//! - `ingestion_orphan_pool_size` - Current orphan pool size
//! - `ingestion_best_height` - Height of the best tip
//! - `ingestion_process_latency_seconds` - Time spent in `process_block`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, register_int_gauge,
    CounterVec, Histogram, IntCounter, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_ACCEPTED: IntCounter = register_int_counter!(
        "ingestion_blocks_accepted_total",
        "Total number of blocks accepted into the chain index"
    )
    .expect("Failed to create BLOCKS_ACCEPTED metric");

    /// Rejected blocks, labeled by error kind
    pub static ref BLOCKS_REJECTED: CounterVec = register_counter_vec!(
        "ingestion_blocks_rejected_total",
        "Total number of blocks rejected",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    pub static ref ORPHANS_ADDED: IntCounter = register_int_counter!(
        "ingestion_orphans_added_total",
        "Total number of blocks parked as orphans"
    )
    .expect("Failed to create ORPHANS_ADDED metric");

    pub static ref ORPHANS_EVICTED: IntCounter = register_int_counter!(
        "ingestion_orphans_evicted_total",
        "Total number of orphans dropped by expiry or capacity"
    )
    .expect("Failed to create ORPHANS_EVICTED metric");

    pub static ref ORPHAN_POOL_SIZE: IntGauge = register_int_gauge!(
        "ingestion_orphan_pool_size",
        "Number of blocks currently waiting for a parent"
    )
    .expect("Failed to create ORPHAN_POOL_SIZE metric");

    pub static ref BEST_HEIGHT: IntGauge = register_int_gauge!(
        "ingestion_best_height",
        "Height of the current best tip"
    )
    .expect("Failed to create BEST_HEIGHT metric");

    pub static ref PROCESS_LATENCY: Histogram = register_histogram!(
        "ingestion_process_latency_seconds",
        "Time spent processing one block, including orphan resolution",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to create PROCESS_LATENCY metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_accepted() {
    BLOCKS_ACCEPTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_orphan_added() {
    ORPHANS_ADDED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_orphans_evicted(count: usize) {
    ORPHANS_EVICTED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn set_orphan_pool_size(size: usize) {
    ORPHAN_POOL_SIZE.set(size as i64);
}

#[cfg(feature = "metrics")]
pub fn set_best_height(height: u64) {
    BEST_HEIGHT.set(height as i64);
}

#[cfg(feature = "metrics")]
pub fn record_process_latency(seconds: f64) {
    PROCESS_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_orphan_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_orphans_evicted(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_orphan_pool_size(_size: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_best_height(_height: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_process_latency(_seconds: f64) {}
