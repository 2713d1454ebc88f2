//! # Shared Types Crate
//!
//! Primitive types used across the Quantum-Chain ingestion workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, big integers and storage errors are
//!   defined once here and re-used by every crate.
//! - **No pipeline logic**: validation, orphan handling and chain selection
//!   live in `qc-block-ingestion`.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
