//! # Orphan Flood
//!
//! A peer streams blocks whose parents do not exist. The pool must stay
//! bounded, keep both indices in step and still promote honest orphans.

#[cfg(test)]
mod tests {
    use crate::fixtures::{chain, mine, test_config, TestNode, GENESIS_TIME};
    use qc_block_ingestion::domain::{compact_to_target, hash_to_u256};
    use qc_block_ingestion::{BlockCandidate, IngestionError, TimeSource};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::Hash;

    const MAX_ORPHANS: usize = 20;

    fn flood_node() -> TestNode {
        let mut config = test_config();
        config.orphans.max_orphans = MAX_ORPHANS;
        config.orphans.orphan_ttl_secs = 600;
        TestNode::with_config(config, vec![])
    }

    fn junk_orphans(count: usize, seed: u64) -> Vec<BlockCandidate> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let parent: Hash = rng.gen();
                mine(parent, GENESIS_TIME + i as u64, 10_000 + i as u64)
            })
            .collect()
    }

    #[test]
    fn test_pool_stays_bounded() {
        let node = flood_node();
        for block in junk_orphans(200, 1) {
            assert!(node.submit(&block).unwrap());
            assert!(node.service.orphan_count() <= MAX_ORPHANS);
        }
        assert_eq!(node.service.orphan_count(), MAX_ORPHANS);
        assert!(node.orphan_indices_consistent());
        assert_eq!(node.service.chain_len(), 0);
        assert!(node.notifier.get_events().is_empty());
    }

    #[test]
    fn test_flood_on_one_missing_parent() {
        let node = flood_node();
        let missing = [0xab; 32];
        for i in 0..100u64 {
            let block = mine(missing, GENESIS_TIME + i, 20_000 + i);
            node.submit(&block).unwrap();
        }
        assert_eq!(node.service.orphan_count(), MAX_ORPHANS);
        assert!(node.orphan_indices_consistent());
        let dependents = node.service.inspect(|state| state.orphans.dependents(&missing).len());
        assert_eq!(dependents, MAX_ORPHANS);
    }

    #[test]
    fn test_honest_orphan_survives_and_promotes() {
        let node = flood_node();
        let blocks = chain(2);
        for block in junk_orphans(MAX_ORPHANS - 1, 2) {
            node.submit(&block).unwrap();
        }
        assert!(node.submit(&blocks[1]).unwrap());
        assert_eq!(node.service.orphan_count(), MAX_ORPHANS);

        assert!(!node.submit(&blocks[0]).unwrap());
        assert_eq!(node.service.best_tip().unwrap().hash, blocks[1].hash());
        assert_eq!(node.service.orphan_count(), MAX_ORPHANS - 1);
        assert!(node.orphan_indices_consistent());
    }

    #[test]
    fn test_replayed_orphan_rejected_as_duplicate() {
        let node = flood_node();
        let junk = junk_orphans(5, 3);
        for block in &junk {
            node.submit(block).unwrap();
        }
        for block in &junk {
            assert!(matches!(
                node.submit(block),
                Err(IngestionError::DuplicateBlock { orphan: true, .. })
            ));
        }
        assert_eq!(node.service.orphan_count(), 5);
    }

    #[test]
    fn test_stale_flood_swept_on_next_insert() {
        let node = flood_node();
        for block in junk_orphans(MAX_ORPHANS, 4) {
            node.submit(&block).unwrap();
        }
        let ttl = node.service.config().orphans.orphan_ttl_secs;
        node.clock.advance(ttl + 1);

        let fresh = mine([0xcd; 32], GENESIS_TIME, 30_000);
        assert!(node.submit(&fresh).unwrap());
        assert_eq!(node.service.orphan_count(), 1);
        assert!(node.service.is_known_orphan(&fresh.hash()));
        assert!(node.orphan_indices_consistent());
    }

    #[test]
    fn test_invalid_work_never_pooled() {
        let node = flood_node();
        let target = compact_to_target(crate::fixtures::EASY_BITS).unwrap();
        let mined = mine([0xef; 32], GENESIS_TIME, 40_000);
        let (mut header, transactions) = mined.into_parts();
        while hash_to_u256(&header.hash()) <= target {
            header.nonce += 1;
        }
        let block = BlockCandidate::new(header, transactions);

        assert!(matches!(
            node.submit(&block),
            Err(IngestionError::HighHash { .. })
        ));
        assert_eq!(node.service.orphan_count(), 0);
    }

    #[test]
    fn test_far_future_orphan_never_pooled() {
        let node = flood_node();
        let now = node.clock.adjusted_time();
        let block = mine([0x11; 32], now + 365 * 24 * 60 * 60, 50_000);

        assert!(matches!(
            node.submit(&block),
            Err(IngestionError::TimeTooNew { .. })
        ));
        assert_eq!(node.service.orphan_count(), 0);
    }
}
