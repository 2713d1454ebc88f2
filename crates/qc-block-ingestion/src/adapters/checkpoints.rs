//! Static checkpoint list

use crate::domain::{ChainIndex, Checkpoint, IngestionResult};
use crate::ports::CheckpointLocator;

/// Checkpoints compiled in or loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCheckpoints {
    /// Sorted by height
    checkpoints: Vec<Checkpoint>,
}

impl StaticCheckpoints {
    pub fn new(mut checkpoints: Vec<Checkpoint>) -> Self {
        checkpoints.sort_by_key(|c| c.height);
        Self { checkpoints }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

impl CheckpointLocator for StaticCheckpoints {
    fn find_previous_checkpoint(&self, index: &ChainIndex) -> IngestionResult<Option<Checkpoint>> {
        let Some(best_height) = index.best_height() else {
            return Ok(None);
        };

        Ok(self
            .checkpoints
            .iter()
            .rev()
            .find(|c| c.height <= best_height)
            .cloned())
    }
}
