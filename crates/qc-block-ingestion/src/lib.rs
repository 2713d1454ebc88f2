//! # qc-block-ingestion
//!
//! Block ingestion core for Quantum-Chain.
//!
//! ## Architecture
//!
//! Decides, for each block received from the network, whether it is a
//! duplicate, an orphan, invalid, or acceptable, and drives acceptance of
//! any orphans that become connectable once their parent arrives.
//!
//! ```text
//!            process_block
//!                  │
//!   duplicate ─► sanity ─► checkpoint gate
//!                                │
//!          ┌─────────────────────┴──────────────────┐
//!          ↓                                        ↓
//!   [Orphan Pool]                          maybe_accept_block
//!          ↑                                        │
//!          └──────────── process_orphans ◄──────────┘
//! ```
//!
//! Everything chain-specific (consensus proofs, stake metadata, best-chain
//! selection, storage, time) is reached through the outbound ports, with
//! reference adapters in [`adapters`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc_block_ingestion::adapters::{InMemoryBlockStore, RecordingNotifier, SystemTimeSource};
//! use qc_block_ingestion::{BehaviorFlags, BlockIngestionService, IngestionConfig, IngestionDependencies};
//!
//! let deps = IngestionDependencies::reference(
//!     IngestionConfig::from_env(),
//!     Arc::new(InMemoryBlockStore::new()),
//!     Arc::new(RecordingNotifier::new()),
//!     checkpoints,
//! );
//! let service = BlockIngestionService::new(deps);
//!
//! let is_orphan = service.process_block(block, &SystemTimeSource, BehaviorFlags::NONE)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod logging;
pub mod metrics;
pub mod ports;
pub mod replay;
pub mod service;
pub mod state;

// Re-export main types
pub use domain::{
    BehaviorFlags, BlockCandidate, BlockHeader, BlockMeta, BlockNode, ChainIndex, Checkpoint,
    IngestionConfig, IngestionError, IngestionResult, OrphanPool, Transaction,
};
pub use ports::{BlockIngestionApi, Notification, NotificationKind, TimeSource};
pub use service::{BlockIngestionService, IngestionDependencies};
