//! Orphan resolution

use super::BlockIngestionService;
use crate::domain::{BehaviorFlags, IngestionResult};
use crate::ports::TimeSource;
use crate::state::IngestionState;
use shared_types::{DisplayHash, Hash};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug_span, trace, warn};

impl BlockIngestionService {
    /// Accept every orphan that descends from `root`, breadth first.
    ///
    /// The first acceptance error aborts the walk. Orphans removed before
    /// the failure stay removed; orphans not yet reached stay pooled.
    /// Returns the number of promoted blocks.
    pub(crate) fn process_orphans(
        &self,
        state: &mut IngestionState,
        root: Hash,
        time_source: &dyn TimeSource,
        flags: BehaviorFlags,
    ) -> IngestionResult<usize> {
        let span = debug_span!("process_orphans", root = %DisplayHash(root).short());
        let _enter = span.enter();
        let started = Instant::now();

        let mut queue = VecDeque::from([root]);
        let mut promoted = 0;

        while let Some(parent) = queue.pop_front() {
            // Snapshot: removal below rewrites the sibling list
            for orphan_hash in state.orphans.dependents(&parent) {
                let Some(entry) = state.orphans.remove(&orphan_hash) else {
                    warn!(
                        orphan = %DisplayHash(orphan_hash).short(),
                        parent = %DisplayHash(parent).short(),
                        "Orphan listed under its parent is missing from the pool"
                    );
                    continue;
                };

                self.deps.rules.on_orphan_removed(&entry.block);
                self.maybe_accept_block(state, entry.block, time_source, flags)?;

                queue.push_back(orphan_hash);
                promoted += 1;
            }
        }

        trace!(
            promoted,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Finished processing orphans"
        );
        Ok(promoted)
    }
}
