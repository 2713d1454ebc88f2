//! # Concurrent Submission
//!
//! The service serializes callers behind one lock; blocks submitted from
//! many threads must end in the same state as a sequential run.

#[cfg(test)]
mod tests {
    use crate::fixtures::{chain, fork, TestNode};
    use qc_block_ingestion::adapters::{BroadcastNotifier, InMemoryBlockStore, SystemTimeSource};
    use qc_block_ingestion::{
        BehaviorFlags, BlockCandidate, BlockIngestionService, IngestionDependencies,
        IngestionError, NotificationKind,
    };
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parallel_submitters_converge() {
        let node = TestNode::new();
        let blocks = chain(30);
        let side = fork(&blocks[10], 5, 900);
        let all: Vec<BlockCandidate> = blocks.iter().chain(side.iter()).cloned().collect();

        thread::scope(|scope| {
            for worker in 0..4usize {
                let node = &node;
                let all = &all;
                scope.spawn(move || {
                    // Each worker walks the list from a different offset and
                    // direction so arrivals interleave
                    let n = all.len();
                    for i in 0..n {
                        let idx = if worker % 2 == 0 {
                            (i + worker * 7) % n
                        } else {
                            n - 1 - (i + worker * 5) % n
                        };
                        match node.submit(&all[idx]) {
                            Ok(_) | Err(IngestionError::DuplicateBlock { .. }) => {}
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                });
            }
        });

        assert_eq!(node.service.orphan_count(), 0);
        assert!(node.orphan_indices_consistent());
        assert_eq!(node.service.best_tip().unwrap().hash, blocks[29].hash());
        // Each block announced exactly once
        assert_eq!(node.notifier.event_count(), all.len());
    }

    #[tokio::test]
    async fn test_broadcast_subscriber_sees_accepted_blocks() {
        let notifier = Arc::new(BroadcastNotifier::with_capacity(64));
        let mut rx = notifier.subscribe();
        let deps = IngestionDependencies::reference(
            crate::fixtures::test_config(),
            Arc::new(InMemoryBlockStore::new()),
            notifier.clone(),
            vec![],
        );
        let service = Arc::new(BlockIngestionService::new(deps));
        let blocks = chain(5);

        let submitter = {
            let service = service.clone();
            let blocks = blocks.clone();
            tokio::task::spawn_blocking(move || {
                for block in blocks {
                    service
                        .process_block(block, &SystemTimeSource, BehaviorFlags::NONE)
                        .unwrap();
                }
            })
        };
        submitter.await.unwrap();

        for block in &blocks {
            let notification = rx.recv().await.unwrap();
            assert_eq!(notification.kind, NotificationKind::BlockAccepted);
            assert_eq!(notification.block.hash(), block.hash());
        }
        assert_eq!(notifier.published(), 5);
    }
}
