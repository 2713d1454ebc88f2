//! # Checkpoint Bypass
//!
//! Attempts to rewrite history below a checkpoint, or to extend it with
//! cheap work, must fail before anything reaches the index or the pool.

#[cfg(test)]
mod tests {
    use crate::fixtures::{chain, fork, mine, test_config, TestNode, GENESIS_TIME};
    use qc_block_ingestion::{
        BehaviorFlags, BlockCandidate, Checkpoint, IngestionConfig, IngestionError,
    };

    const HARD_BITS: u32 = 0x1d00_ffff;

    fn checkpointed_node(len: usize, at: usize) -> (TestNode, Vec<BlockCandidate>) {
        let blocks = chain(len);
        let cp = &blocks[at];
        let checkpoint = Checkpoint::new(at as u64, cp.hash(), cp.timestamp(), cp.bits());
        let node = TestNode::with_config(test_config(), vec![checkpoint]);
        for block in &blocks {
            node.submit(block).unwrap();
        }
        (node, blocks)
    }

    #[test]
    fn test_deep_fork_below_checkpoint_rejected() {
        let (node, blocks) = checkpointed_node(10, 6);
        let before = node.snapshot();

        // A longer private chain from height 1 whose early blocks predate the checkpoint
        let attack = fork(&blocks[1], 12, 60_000);
        let mut rejected = 0;
        for block in &attack {
            match node.submit(block) {
                Err(IngestionError::CheckpointTimeTooOld { .. }) => rejected += 1,
                // Later blocks lost their parent and can only wait as orphans
                Err(e) => panic!("unexpected error: {e}"),
                Ok(orphan) => assert!(orphan, "attack block connected"),
            }
        }

        assert!(rejected > 0);
        assert_eq!(node.service.best_tip(), before.best_tip);
        assert_eq!(node.service.chain_len(), before.chain_len);
        assert!(attack[..rejected]
            .iter()
            .all(|b| !node.service.is_known_orphan(&b.hash())));
    }

    #[test]
    fn test_orphan_predating_checkpoint_not_pooled() {
        let (node, blocks) = checkpointed_node(5, 4);
        let stale = mine([0x42; 32], blocks[4].timestamp() - 1, 61_000);

        assert!(matches!(
            node.submit(&stale),
            Err(IngestionError::CheckpointTimeTooOld { .. })
        ));
        assert_eq!(node.service.orphan_count(), 0);
    }

    #[test]
    fn test_cheap_work_after_checkpoint_rejected() {
        let blocks = chain(2);
        let checkpoint = Checkpoint::new(0, blocks[0].hash(), GENESIS_TIME, HARD_BITS);
        let node = TestNode::with_config(test_config(), vec![checkpoint]);
        node.submit(&blocks[0]).unwrap();

        assert!(matches!(
            node.submit(&blocks[1]),
            Err(IngestionError::DifficultyTooLow { .. })
        ));
        // Cheap orphans are gated too
        let orphan = mine([0x43; 32], GENESIS_TIME + 60, 62_000);
        assert!(matches!(
            node.submit(&orphan),
            Err(IngestionError::DifficultyTooLow { .. })
        ));
        assert_eq!(node.service.orphan_count(), 0);
        assert_eq!(node.service.chain_len(), 1);
    }

    #[test]
    fn test_minimum_difficulty_relaxes_with_elapsed_time() {
        let blocks = chain(2);
        let checkpoint = Checkpoint::new(0, blocks[0].hash(), GENESIS_TIME, HARD_BITS);
        // One-second periods: 600s of elapsed time loosens the bound to the limit
        let config = IngestionConfig {
            target_timespan_secs: 1,
            ..test_config()
        };
        let node = TestNode::with_config(config, vec![checkpoint]);
        node.submit(&blocks[0]).unwrap();

        assert!(!node.submit(&blocks[1]).unwrap());
        assert_eq!(node.service.best_tip().unwrap().hash, blocks[1].hash());
    }

    #[test]
    fn test_fast_add_skips_only_the_difficulty_bound() {
        let blocks = chain(2);
        let checkpoint = Checkpoint::new(0, blocks[0].hash(), GENESIS_TIME, HARD_BITS);
        let node = TestNode::with_config(test_config(), vec![checkpoint]);
        node.submit(&blocks[0]).unwrap();

        let stale = mine(blocks[0].hash(), GENESIS_TIME - 1, 63_000);
        assert!(matches!(
            node.submit_with(&stale, BehaviorFlags::NONE.with_fast_add()),
            Err(IngestionError::CheckpointTimeTooOld { .. })
        ));

        assert!(!node
            .submit_with(&blocks[1], BehaviorFlags::NONE.with_fast_add())
            .unwrap());
    }
}
