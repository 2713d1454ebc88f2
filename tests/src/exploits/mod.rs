//! # Exploit Simulations
//!
//! Hostile inputs a peer can feed the pipeline, and the bounds that hold.

pub mod checkpoint_bypass;
pub mod orphan_flood;
