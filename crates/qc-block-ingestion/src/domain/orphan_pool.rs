//! # Orphan Pool
//!
//! Holds blocks whose parent is not yet known.
//!
//! ## Structure
//!
//! Two maps kept in sync behind [`OrphanPool::insert`] and
//! [`OrphanPool::remove`]:
//! - `orphans`: own hash → entry
//! - `by_parent`: parent hash → own hashes of every orphan waiting on it
//!
//! Every hash in `orphans` appears exactly once in `by_parent` under its
//! parent, and `by_parent` never lists a hash that is not in `orphans`.
//!
//! ## Resource Bounds
//!
//! - Entries expire `orphan_ttl_secs` after insertion; expired entries are
//!   swept on every insertion and by [`OrphanPool::expire`].
//! - The pool never holds more than `max_orphans` entries. When full, the
//!   entry closest to expiry is evicted to make room.

use super::BlockCandidate;
use shared_types::Hash;
use std::collections::HashMap;

/// Configuration for the orphan pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanPoolConfig {
    /// Maximum number of orphans held at once (default: 100).
    pub max_orphans: usize,
    /// Seconds an orphan may wait for its parent (default: 1 hour).
    pub orphan_ttl_secs: u64,
}

impl Default for OrphanPoolConfig {
    fn default() -> Self {
        Self {
            max_orphans: 100,
            orphan_ttl_secs: 60 * 60,
        }
    }
}

impl OrphanPoolConfig {
    pub fn new(max_orphans: usize, orphan_ttl_secs: u64) -> Self {
        Self {
            max_orphans,
            orphan_ttl_secs,
        }
    }

    /// Validate configuration values.
    pub fn is_valid(&self) -> bool {
        self.max_orphans > 0
            && self.max_orphans <= 10_000
            && self.orphan_ttl_secs > 0
    }
}

/// A block waiting for its parent.
#[derive(Debug, Clone)]
pub struct OrphanEntry {
    pub block: BlockCandidate,
    /// Unix seconds after which the entry may be swept
    pub expires_at: u64,
}

impl OrphanEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// Dual-indexed pool of orphan blocks.
#[derive(Debug)]
pub struct OrphanPool {
    orphans: HashMap<Hash, OrphanEntry>,
    by_parent: HashMap<Hash, Vec<Hash>>,
    config: OrphanPoolConfig,
}

impl OrphanPool {
    pub fn new(config: OrphanPoolConfig) -> Self {
        Self {
            orphans: HashMap::new(),
            by_parent: HashMap::new(),
            config,
        }
    }

    /// Add an orphan.
    ///
    /// Sweeps expired entries first, then evicts the entry closest to
    /// expiry if the pool is still full. Returns every entry removed to make
    /// room. Inserting a hash that is already pooled is a no-op.
    pub fn insert(&mut self, block: BlockCandidate, now: u64) -> Vec<OrphanEntry> {
        let hash = block.hash();
        if self.orphans.contains_key(&hash) {
            return Vec::new();
        }

        let mut removed = self.expire(now);
        while self.orphans.len() >= self.config.max_orphans {
            let Some(oldest) = self.oldest() else {
                break;
            };
            if let Some(entry) = self.remove(&oldest) {
                removed.push(entry);
            }
        }

        let parent = block.parent_hash();
        self.by_parent.entry(parent).or_default().push(hash);
        self.orphans.insert(
            hash,
            OrphanEntry {
                block,
                expires_at: now.saturating_add(self.config.orphan_ttl_secs),
            },
        );

        removed
    }

    /// Remove an orphan from both indices.
    pub fn remove(&mut self, hash: &Hash) -> Option<OrphanEntry> {
        let entry = self.orphans.remove(hash)?;
        let parent = entry.block.parent_hash();

        if let Some(siblings) = self.by_parent.get_mut(&parent) {
            siblings.retain(|sibling| sibling != hash);
            if siblings.is_empty() {
                self.by_parent.remove(&parent);
            }
        }

        Some(entry)
    }

    /// Remove every entry that has expired at `now`.
    pub fn expire(&mut self, now: u64) -> Vec<OrphanEntry> {
        let expired: Vec<Hash> = self
            .orphans
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(hash, _)| *hash)
            .collect();

        expired.iter().filter_map(|hash| self.remove(hash)).collect()
    }

    /// Snapshot of the orphans waiting on `parent`.
    ///
    /// The returned list is owned, so callers may remove entries while
    /// walking it.
    pub fn dependents(&self, parent: &Hash) -> Vec<Hash> {
        self.by_parent.get(parent).cloned().unwrap_or_default()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.orphans.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&OrphanEntry> {
        self.orphans.get(hash)
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Follow parent links through the pool to the first ancestor that is
    /// not itself an orphan. That ancestor is the block to request from peers.
    pub fn root_of(&self, hash: &Hash) -> Hash {
        let mut root = *hash;
        let mut current = *hash;
        while let Some(entry) = self.orphans.get(&current) {
            root = entry.block.parent_hash();
            current = root;
        }
        root
    }

    /// Check that the two indices agree with each other.
    pub fn is_consistent(&self) -> bool {
        let listed: usize = self.by_parent.values().map(Vec::len).sum();
        if listed != self.orphans.len() {
            return false;
        }

        let forward = self.orphans.iter().all(|(hash, entry)| {
            self.by_parent
                .get(&entry.block.parent_hash())
                .is_some_and(|siblings| siblings.iter().filter(|s| *s == hash).count() == 1)
        });

        let backward = self.by_parent.iter().all(|(parent, siblings)| {
            !siblings.is_empty()
                && siblings.iter().all(|hash| {
                    self.orphans
                        .get(hash)
                        .is_some_and(|entry| entry.block.parent_hash() == *parent)
                })
        });

        forward && backward
    }

    fn oldest(&self) -> Option<Hash> {
        self.orphans
            .iter()
            .min_by_key(|(hash, entry)| (entry.expires_at, **hash))
            .map(|(hash, _)| *hash)
    }
}
