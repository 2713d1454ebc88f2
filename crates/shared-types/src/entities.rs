//! # Core Chain Primitives
//!
//! Hash and big-integer types shared by every crate in the workspace.

use std::fmt;

// Re-export U256 from primitive-types for targets and cumulative work
pub use primitive_types::U256;

/// A 32-byte block or transaction hash.
pub type Hash = [u8; 32];

/// The all-zero hash. A block whose parent hash is zero is a genesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Hex rendering of a [`Hash`] for logs and error messages.
///
/// ```
/// use shared_types::DisplayHash;
///
/// let hash = [0xABu8; 32];
/// assert_eq!(DisplayHash(hash).short(), "abababababababab");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHash(pub Hash);

impl DisplayHash {
    /// First 8 bytes as hex, enough to tell blocks apart in logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Display for DisplayHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DisplayHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<Hash> for DisplayHash {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

impl From<&Hash> for DisplayHash {
    fn from(hash: &Hash) -> Self {
        Self(*hash)
    }
}
