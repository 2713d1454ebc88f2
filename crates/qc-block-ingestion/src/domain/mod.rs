//! Domain layer for block ingestion
//!
//! Pure data and policy, free of I/O:
//! - block: candidates as received, header hashing, merkle commitment
//! - node / chain: accepted-block arena
//! - orphan_pool: dual-indexed pool of blocks waiting for a parent
//! - checkpoint: checkpoint gate
//! - difficulty: compact target encoding and work arithmetic

mod block;
mod chain;
mod checkpoint;
mod config;
mod difficulty;
mod error;
mod flags;
mod node;
mod orphan_pool;

pub use block::*;
pub use chain::*;
pub use checkpoint::*;
pub use config::*;
pub use difficulty::*;
pub use error::*;
pub use flags::*;
pub use node::*;
pub use orphan_pool::*;
