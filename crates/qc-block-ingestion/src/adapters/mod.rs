//! Adapters layer (Hexagonal Architecture)
//!
//! Reference implementations of every outbound port. They keep the pipeline
//! usable end to end; production deployments swap in their own storage,
//! consensus rules and chain selection.

mod chain_selector;
mod checkpoints;
mod context;
mod notifier;
mod retarget;
mod rules;
mod sanity;
mod store;
mod time;

pub use chain_selector::*;
pub use checkpoints::*;
pub use context::*;
pub use notifier::*;
pub use retarget::*;
pub use rules::*;
pub use sanity::*;
pub use store::*;
pub use time::*;
