//! Ingestion Service - Core business logic
//!
//! # Pipeline
//! ```text
//! process_block ──► duplicate ──► sanity ──► checkpoint gate
//!                                                 │
//!                       parent unknown ◄──────────┴──────────► parent known
//!                             │                                     │
//!                       orphan pool                        maybe_accept_block
//!                                                                   │
//!                                                           process_orphans
//! ```
//!
//! One mutex guards the chain index and orphan pool for the whole call, so
//! concurrent callers are serialized.

mod acceptance;
mod resolver;

use crate::adapters::{
    BasicContextChecker, BasicSanityChecker, MaxAdjustmentRetarget, MostWorkChainSelector,
    ProofOfWorkRules, StaticCheckpoints,
};
use crate::domain::{
    BehaviorFlags, BlockCandidate, BlockNode, CheckpointGate, Checkpoint, IngestionConfig,
    IngestionError, IngestionResult,
};
use crate::metrics;
use crate::ports::{
    BlockIngestionApi, BlockStore, ChainRules, ChainSelector, CheckpointLocator, ContextChecker,
    DifficultyRetarget, NotificationSink, SanityChecker, TimeSource,
};
use crate::state::IngestionState;
use parking_lot::Mutex;
use shared_types::{DisplayHash, Hash, U256, ZERO_HASH};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, info, trace, warn};

/// Collaborators for [`BlockIngestionService`]
pub struct IngestionDependencies {
    pub store: Arc<dyn BlockStore>,
    pub sanity: Arc<dyn SanityChecker>,
    pub context: Arc<dyn ContextChecker>,
    pub rules: Arc<dyn ChainRules>,
    pub selector: Arc<dyn ChainSelector>,
    pub checkpoints: Arc<dyn CheckpointLocator>,
    pub retarget: Arc<dyn DifficultyRetarget>,
    pub notifier: Arc<dyn NotificationSink>,
    pub config: IngestionConfig,
}

impl IngestionDependencies {
    /// Wire the reference adapters around a store and a notification sink.
    pub fn reference(
        config: IngestionConfig,
        store: Arc<dyn BlockStore>,
        notifier: Arc<dyn NotificationSink>,
        checkpoints: Vec<Checkpoint>,
    ) -> Self {
        Self {
            sanity: Arc::new(BasicSanityChecker::new(config.max_future_block_secs)),
            context: Arc::new(BasicContextChecker::default()),
            rules: Arc::new(ProofOfWorkRules),
            selector: Arc::new(MostWorkChainSelector::new(store.clone())),
            checkpoints: Arc::new(StaticCheckpoints::new(checkpoints)),
            retarget: Arc::new(MaxAdjustmentRetarget::from_config(&config)),
            store,
            notifier,
            config,
        }
    }
}

/// Block ingestion service
pub struct BlockIngestionService {
    deps: IngestionDependencies,
    gate: CheckpointGate,
    pow_limit: U256,
    state: Mutex<IngestionState>,
}

impl BlockIngestionService {
    pub fn new(deps: IngestionDependencies) -> Self {
        Self {
            gate: CheckpointGate::new(deps.config.checkpoints.clone()),
            pow_limit: deps.config.pow_limit(),
            state: Mutex::new(IngestionState::new(deps.config.orphans.clone())),
            deps,
        }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.deps.config
    }

    /// Run one block through the pipeline.
    ///
    /// Returns `Ok(true)` when the block was parked as an orphan. Effects
    /// committed before an error (accepted blocks, promoted orphans) stay.
    pub fn process_block(
        &self,
        block: BlockCandidate,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<bool> {
        let started = Instant::now();
        let hash = block.hash();
        let span = debug_span!("process_block", block_hash = %DisplayHash(hash).short());
        let _enter = span.enter();
        trace!(?flags, "Processing block");

        let mut state = self.state.lock();
        let result = self.process_locked(&mut state, block, time_source, flags);

        if let Err(e) = &result {
            metrics::record_block_rejected(e.label());
            debug!(error = %e, "Block not accepted");
        }
        metrics::set_orphan_pool_size(state.orphans.len());
        if let Some(height) = state.chain.best_height() {
            metrics::set_best_height(height);
        }

        let elapsed = started.elapsed();
        metrics::record_process_latency(elapsed.as_secs_f64());
        trace!(elapsed_us = elapsed.as_micros() as u64, "Finished processing block");
        result
    }

    fn process_locked(
        &self,
        state: &mut IngestionState,
        block: BlockCandidate,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<bool> {
        let hash = block.hash();

        if self.exists_in_chain(state, &hash)? {
            return Err(IngestionError::DuplicateBlock {
                hash,
                orphan: false,
            });
        }
        if state.orphans.contains(&hash) {
            return Err(IngestionError::DuplicateBlock { hash, orphan: true });
        }

        self.deps.rules.pre_sanity(&block)?;
        self.deps
            .sanity
            .check_block_sanity(&block, self.pow_limit, time_source, flags)?;

        let checkpoint = self.deps.checkpoints.find_previous_checkpoint(&state.chain)?;
        self.gate
            .check(&block, checkpoint.as_ref(), flags, |bits, elapsed| {
                self.deps.retarget.easiest_difficulty(bits, elapsed)
            })?;

        let parent = block.parent_hash();
        if parent != ZERO_HASH && !self.exists_in_chain(state, &parent)? {
            if flags.dry_run {
                debug!(parent = %DisplayHash(parent).short(), "Dry run, block would be an orphan");
            } else {
                self.add_orphan(state, block, time_source)?;
            }
            return Ok(true);
        }

        self.maybe_accept_block(state, block, time_source, flags)?;

        if !flags.dry_run {
            self.process_orphans(state, hash, time_source, flags)?;
        }

        Ok(false)
    }

    fn exists_in_chain(&self, state: &IngestionState, hash: &Hash) -> IngestionResult<bool> {
        if state.chain.contains(hash) {
            return Ok(true);
        }
        Ok(self.deps.store.exists_by_hash(hash)?)
    }

    fn add_orphan(
        &self,
        state: &mut IngestionState,
        block: BlockCandidate,
        time_source: &dyn TimeSource,
    ) -> IngestionResult<()> {
        self.deps.rules.on_orphan_added(&block)?;

        let hash = block.hash();
        let parent = block.parent_hash();
        let now = time_source.adjusted_time();
        let dropped = state.orphans.insert(block, now);

        for entry in &dropped {
            let dropped_hash = DisplayHash(entry.block.hash()).short();
            if entry.is_expired(now) {
                debug!(orphan = %dropped_hash, "Expired orphan block");
            } else {
                warn!(orphan = %dropped_hash, "Orphan pool full, evicted oldest orphan");
            }
            self.deps.rules.on_orphan_removed(&entry.block);
        }
        metrics::record_orphans_evicted(dropped.len());
        metrics::record_orphan_added();

        info!(
            block_hash = %DisplayHash(hash).short(),
            parent = %DisplayHash(parent).short(),
            pool_size = state.orphans.len(),
            "Adding orphan block"
        );
        Ok(())
    }

    /// Check whether a block is in the chain index or the persistent store.
    pub fn block_exists(&self, hash: &Hash) -> IngestionResult<bool> {
        let state = self.state.lock();
        self.exists_in_chain(&state, hash)
    }

    pub fn is_known_orphan(&self, hash: &Hash) -> bool {
        self.state.lock().orphans.contains(hash)
    }

    pub fn orphan_count(&self) -> usize {
        self.state.lock().orphans.len()
    }

    /// First ancestor of `hash` that is not itself a pooled orphan.
    pub fn orphan_root(&self, hash: &Hash) -> Hash {
        self.state.lock().orphans.root_of(hash)
    }

    pub fn best_tip(&self) -> Option<BlockNode> {
        self.state.lock().chain.best_tip().cloned()
    }

    pub fn node(&self, hash: &Hash) -> Option<BlockNode> {
        self.state.lock().chain.get(hash).cloned()
    }

    /// Number of nodes held in memory
    pub fn chain_len(&self) -> usize {
        self.state.lock().chain.len()
    }

    /// Drop orphans that expired at `now`, returning how many were removed.
    pub fn expire_orphans(&self, now: u64) -> usize {
        let mut state = self.state.lock();
        let expired = state.orphans.expire(now);
        for entry in &expired {
            self.deps.rules.on_orphan_removed(&entry.block);
        }
        if !expired.is_empty() {
            debug!(expired = expired.len(), "Expired orphan blocks");
        }
        metrics::record_orphans_evicted(expired.len());
        metrics::set_orphan_pool_size(state.orphans.len());
        expired.len()
    }

    /// Read-only access to the locked state.
    pub fn inspect<R>(&self, f: impl FnOnce(&IngestionState) -> R) -> R {
        f(&self.state.lock())
    }
}

impl BlockIngestionApi for BlockIngestionService {
    fn process_block(
        &self,
        block: BlockCandidate,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<bool> {
        BlockIngestionService::process_block(self, block, time_source, flags)
    }

    fn block_exists(&self, hash: &Hash) -> IngestionResult<bool> {
        BlockIngestionService::block_exists(self, hash)
    }

    fn orphan_root(&self, hash: &Hash) -> Hash {
        BlockIngestionService::orphan_root(self, hash)
    }
}
