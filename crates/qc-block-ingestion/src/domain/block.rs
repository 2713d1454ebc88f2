//! Block candidate entities
//!
//! A [`BlockCandidate`] is a block exactly as it was received from the
//! network, before any validation has run.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha3::{Digest, Keccak256};
use shared_types::{Hash, ZERO_HASH};
use std::sync::OnceLock;

/// Block header as carried on the wire.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    #[serde_as(as = "Hex")]
    pub parent_hash: Hash,
    /// Commitment to the transaction list
    #[serde_as(as = "Hex")]
    pub merkle_root: Hash,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// Claimed difficulty target in compact form
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Compute the identity hash of this header
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.bits.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }

    /// A zero parent hash marks the genesis block
    pub fn is_genesis(&self) -> bool {
        self.parent_hash == ZERO_HASH
    }
}

/// A transaction, opaque to the ingestion pipeline apart from its hash.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    #[serde_as(as = "Hex")]
    pub payload: Vec<u8>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(&self.payload);
        hasher.update(self.lock_time.to_le_bytes());
        hasher.finalize().into()
    }
}

/// Chain-specific per-block metadata, filled in by the chain rules during
/// acceptance and carried into the block node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMeta {
    pub is_proof_of_stake: bool,
    pub stake_modifier: u64,
    pub entropy_bit: bool,
}

/// A block as received, pre-validation.
///
/// The identity hash is derived from the header on first use and cached,
/// so the header is read-only once the candidate exists. Rebuild the
/// candidate from [`BlockCandidate::into_parts`] to change it. The height is unknown until acceptance resolves the parent, and is
/// assigned at most once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockCandidate {
    header: BlockHeader,
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub meta: BlockMeta,
    #[serde(skip)]
    hash: OnceLock<Hash>,
    #[serde(skip)]
    height: Option<u64>,
}

impl BlockCandidate {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
            meta: BlockMeta::default(),
            hash: OnceLock::new(),
            height: None,
        }
    }

    /// Identity hash, computed once
    pub fn hash(&self) -> Hash {
        *self.hash.get_or_init(|| self.header.hash())
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn into_parts(self) -> (BlockHeader, Vec<Transaction>) {
        (self.header, self.transactions)
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn merkle_root(&self) -> Hash {
        self.header.merkle_root
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    /// Height assigned during acceptance, if any
    pub fn height(&self) -> Option<u64> {
        self.height
    }

    /// Assign the computed height.
    ///
    /// Returns `false` and keeps the existing value if a height was already
    /// assigned.
    pub fn assign_height(&mut self, height: u64) -> bool {
        if self.height.is_some() {
            return false;
        }
        self.height = Some(height);
        true
    }
}

impl PartialEq for BlockCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl Eq for BlockCandidate {}

/// Merkle root over transaction hashes.
///
/// Odd levels duplicate their last element. An empty list commits to
/// [`ZERO_HASH`].
pub fn compute_merkle_root(transactions: &[Transaction]) -> Hash {
    if transactions.is_empty() {
        return ZERO_HASH;
    }

    let mut level: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut hasher = Keccak256::new();
                hasher.update(left);
                hasher.update(right);
                hasher.finalize().into()
            })
            .collect();
    }
    level[0]
}
