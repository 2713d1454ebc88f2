use crate::domain::{ChainIndex, OrphanPool, OrphanPoolConfig};

/// Mutable state of the ingestion service: the chain index and the orphan
/// pool, always locked together.
pub struct IngestionState {
    pub chain: ChainIndex,
    pub orphans: OrphanPool,
}

impl IngestionState {
    pub fn new(orphan_config: OrphanPoolConfig) -> Self {
        Self {
            chain: ChainIndex::new(),
            orphans: OrphanPool::new(orphan_config),
        }
    }
}
