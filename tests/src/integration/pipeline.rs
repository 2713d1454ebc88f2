//! # Pipeline Properties
//!
//! Duplicate idempotence, height and work monotonicity, checkpoint
//! rejection, dry-run purity and pruning through the full service.

#[cfg(test)]
mod tests {
    use crate::fixtures::{chain, fork, mine, test_config, TestNode, GENESIS_TIME};
    use qc_block_ingestion::{BehaviorFlags, Checkpoint, IngestionError};
    use shared_types::U256;

    // =============================================================================
    // DUPLICATES
    // =============================================================================

    #[test]
    fn test_duplicate_submission_is_idempotent() {
        let node = TestNode::new();
        let blocks = chain(3);
        for block in &blocks {
            node.submit(block).unwrap();
        }
        let before = node.snapshot();

        for block in &blocks {
            let err = node.submit(block).unwrap_err();
            assert!(matches!(
                err,
                IngestionError::DuplicateBlock { orphan: false, .. }
            ));
            assert!(err.is_rule_violation());
        }

        assert_eq!(node.snapshot(), before);
    }

    #[test]
    fn test_duplicate_of_pruned_block_detected_via_store() {
        let mut config = test_config();
        config.min_memory_nodes = 1;
        let node = TestNode::with_config(config, vec![]);
        let blocks = chain(5);
        for block in &blocks {
            node.submit(block).unwrap();
        }
        assert!(node.service.node(&blocks[0].hash()).is_none());

        assert!(matches!(
            node.submit(&blocks[0]),
            Err(IngestionError::DuplicateBlock { orphan: false, .. })
        ));
    }

    // =============================================================================
    // HEIGHT AND WORK
    // =============================================================================

    #[test]
    fn test_heights_and_work_along_every_branch() {
        let node = TestNode::new();
        let main = chain(6);
        let side = fork(&main[2], 2, 1_000);
        for block in main.iter().chain(side.iter()) {
            node.submit(block).unwrap();
        }

        for block in main.iter().chain(side.iter()).skip(1) {
            let child = node.service.node(&block.hash()).unwrap();
            let parent = node.service.node(&block.parent_hash()).unwrap();
            assert_eq!(child.height, parent.height + 1);
            assert!(child.work_sum >= parent.work_sum);
            assert_eq!(child.parent, Some(parent.hash));
        }

        let genesis = node.service.node(&main[0].hash()).unwrap();
        assert_eq!(genesis.height, 0);
        assert!(genesis.work_sum > U256::zero());
        assert_eq!(node.service.best_tip().unwrap().hash, main[5].hash());
    }

    #[test]
    fn test_longer_fork_takes_over() {
        let node = TestNode::new();
        let main = chain(3);
        let side = fork(&main[0], 4, 2_000);
        for block in main.iter().chain(side.iter()) {
            node.submit(block).unwrap();
        }

        let tip = node.service.best_tip().unwrap();
        assert_eq!(tip.hash, side[3].hash());
        assert_eq!(tip.height, 4);
        // Old main chain stays stored, the winning branch is persisted
        assert_eq!(node.store.len(), main.len() + side.len());
        for block in &side {
            assert!(node.service.block_exists(&block.hash()).unwrap());
        }
    }

    // =============================================================================
    // CHECKPOINTS
    // =============================================================================

    #[test]
    fn test_block_older_than_checkpoint_rejected() {
        let blocks = chain(3);
        let checkpoint = Checkpoint::new(
            1,
            blocks[1].hash(),
            blocks[1].timestamp(),
            blocks[1].bits(),
        );
        let node = TestNode::with_config(test_config(), vec![checkpoint.clone()]);
        node.submit(&blocks[0]).unwrap();
        node.submit(&blocks[1]).unwrap();

        // Branch off genesis claiming a time before the checkpoint
        let stale = mine(blocks[0].hash(), checkpoint.timestamp - 1, 77);
        let before = node.snapshot();
        assert!(matches!(
            node.submit(&stale),
            Err(IngestionError::CheckpointTimeTooOld { .. })
        ));
        assert_eq!(node.snapshot(), before);
        assert!(!node.service.is_known_orphan(&stale.hash()));

        // Blocks at or after the checkpoint still connect
        assert!(!node.submit(&blocks[2]).unwrap());
    }

    #[test]
    fn test_difficulty_floor_after_checkpoint() {
        let blocks = chain(2);
        let checkpoint = Checkpoint::new(0, blocks[0].hash(), GENESIS_TIME, 0x1d00_ffff);
        let node = TestNode::with_config(test_config(), vec![checkpoint]);
        node.submit(&blocks[0]).unwrap();

        let err = node.submit(&blocks[1]).unwrap_err();
        assert!(matches!(err, IngestionError::DifficultyTooLow { .. }));
        assert!(node.service.node(&blocks[1].hash()).is_none());
    }

    // =============================================================================
    // DRY RUN
    // =============================================================================

    #[test]
    fn test_dry_run_is_pure() {
        let node = TestNode::new();
        let blocks = chain(4);
        node.submit(&blocks[0]).unwrap();
        node.submit(&blocks[1]).unwrap();
        let dry = BehaviorFlags::NONE.with_dry_run();

        let before = node.snapshot();
        assert!(!node.submit_with(&blocks[2], dry).unwrap());
        assert!(node.submit_with(&blocks[3], dry).unwrap());
        assert_eq!(node.snapshot(), before);

        // Rejections under dry run match the real outcome
        assert!(matches!(
            node.submit_with(&blocks[1], dry),
            Err(IngestionError::DuplicateBlock { .. })
        ));

        // The same blocks still go through for real afterwards
        assert!(!node.submit(&blocks[2]).unwrap());
        assert!(!node.submit(&blocks[3]).unwrap());
        assert_eq!(node.service.best_tip().unwrap().hash, blocks[3].hash());
    }

    #[test]
    fn test_dry_run_with_pruned_parent_leaves_index_alone() {
        let mut config = test_config();
        config.min_memory_nodes = 1;
        let node = TestNode::with_config(config, vec![]);
        let blocks = chain(5);
        for block in &blocks {
            node.submit(block).unwrap();
        }
        let side = fork(&blocks[0], 1, 3_000);

        let before = node.snapshot();
        assert!(!node
            .submit_with(&side[0], BehaviorFlags::NONE.with_dry_run())
            .unwrap());
        assert_eq!(node.snapshot(), before);
        assert!(node.service.node(&blocks[0].hash()).is_none());
    }

    // =============================================================================
    // PRUNING
    // =============================================================================

    #[test]
    fn test_memory_bounded_by_retention_horizon() {
        let mut config = test_config();
        config.min_memory_nodes = 10;
        let node = TestNode::with_config(config, vec![]);
        let blocks = chain(40);
        for block in &blocks {
            node.submit(block).unwrap();
        }

        assert!(node.service.chain_len() <= 12);
        assert_eq!(node.store.len(), 40);
        for block in &blocks {
            assert!(node.service.block_exists(&block.hash()).unwrap());
        }
    }
}
