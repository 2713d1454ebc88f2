//! Error types for the ingestion pipeline

use shared_types::{DisplayHash, Hash, StorageError, U256};

/// Ingestion error types.
///
/// Rule violations raised by collaborators (sanity, context, proof) travel
/// through the pipeline unchanged, so callers can match on the exact kind.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Already have block {}{}", DisplayHash::from(.hash), orphan_suffix(.orphan))]
    DuplicateBlock { hash: Hash, orphan: bool },

    #[error("Block {} has timestamp {timestamp} before last checkpoint timestamp {checkpoint_timestamp}", DisplayHash::from(.hash))]
    CheckpointTimeTooOld {
        hash: Hash,
        timestamp: u64,
        checkpoint_timestamp: u64,
    },

    #[error("Block target difficulty of {target:#066x} is too low when compared to the previous checkpoint (easiest allowed {required:#066x})")]
    DifficultyTooLow { target: U256, required: U256 },

    #[error("Proof check failed for block {}: {source}", DisplayHash::from(.hash))]
    ProofCheckFailed {
        hash: Hash,
        #[source]
        source: Box<IngestionError>,
    },

    // === Context-free sanity ===
    #[error("Malformed block header: {0}")]
    BadHeader(String),

    #[error("Invalid compact difficulty bits {0:#010x}")]
    BadDifficultyBits(u32),

    #[error("Block target {target:#066x} is above the proof-of-work limit {limit:#066x}")]
    UnexpectedDifficulty { target: U256, limit: U256 },

    #[error("Block hash {} is above its claimed target", DisplayHash::from(.hash))]
    HighHash { hash: Hash },

    #[error("Block timestamp {timestamp} is too far in the future (max {max_allowed})")]
    TimeTooNew { timestamp: u64, max_allowed: u64 },

    #[error("Block does not contain any transactions")]
    NoTransactions,

    #[error("Block contains duplicate transaction {}", DisplayHash::from(.0))]
    DuplicateTransaction(Hash),

    #[error("Merkle root mismatch: header {}, computed {}", DisplayHash::from(.header), DisplayHash::from(.computed))]
    BadMerkleRoot { header: Hash, computed: Hash },

    // === Context-dependent ===
    #[error("Block timestamp {timestamp} is not after parent timestamp {parent_timestamp}")]
    TimeTooOld { timestamp: u64, parent_timestamp: u64 },

    #[error("Block version {version} is below the minimum {minimum}")]
    BadVersion { version: u32, minimum: u32 },

    #[error("Block difficulty bits {actual:#010x} do not match expected {expected:#010x}")]
    UnexpectedBits { expected: u32, actual: u32 },

    // === Chain-specific consensus ===
    #[error("Proof-of-stake error: {0}")]
    ProofOfStake(String),

    // === Chain state ===
    #[error("Previous block {} is not known", DisplayHash::from(.0))]
    MissingParent(Hash),

    #[error("Chain selection failed: {0}")]
    ChainSelection(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IngestionError {
    /// Whether the error says the submitted block itself breaks a rule, as
    /// opposed to an infrastructure failure that may succeed on retry.
    pub fn is_rule_violation(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::ChainSelection(_))
    }

    /// Short stable label, used as a metrics dimension.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DuplicateBlock { .. } => "duplicate_block",
            Self::CheckpointTimeTooOld { .. } => "checkpoint_time_too_old",
            Self::DifficultyTooLow { .. } => "difficulty_too_low",
            Self::ProofCheckFailed { .. } => "proof_check_failed",
            Self::BadHeader(_) => "bad_header",
            Self::BadDifficultyBits(_) => "bad_difficulty_bits",
            Self::UnexpectedDifficulty { .. } => "unexpected_difficulty",
            Self::HighHash { .. } => "high_hash",
            Self::TimeTooNew { .. } => "time_too_new",
            Self::NoTransactions => "no_transactions",
            Self::DuplicateTransaction(_) => "duplicate_transaction",
            Self::BadMerkleRoot { .. } => "bad_merkle_root",
            Self::TimeTooOld { .. } => "time_too_old",
            Self::BadVersion { .. } => "bad_version",
            Self::UnexpectedBits { .. } => "unexpected_bits",
            Self::ProofOfStake(_) => "proof_of_stake",
            Self::MissingParent(_) => "missing_parent",
            Self::ChainSelection(_) => "chain_selection",
            Self::Storage(_) => "storage",
        }
    }
}

fn orphan_suffix(orphan: &bool) -> &'static str {
    if *orphan {
        " (orphan)"
    } else {
        ""
    }
}

/// Result type for ingestion operations
pub type IngestionResult<T> = Result<T, IngestionError>;
