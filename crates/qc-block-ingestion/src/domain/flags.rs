//! Behavior flags threaded through one ingestion call

/// Independent toggles that modify how a single `process_block` call behaves.
///
/// Flags are copied by value into every delegated operation and never change
/// during the call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BehaviorFlags {
    /// The block is known to link up to a checkpoint, so checks that the
    /// checkpoint already guarantees may be skipped.
    pub fast_add: bool,
    /// Skip the proof-of-work target check. Testing aid.
    pub no_pow_check: bool,
    /// Run every check and the chain-selection work, but leave the orphan
    /// pool, pruning and notifications untouched.
    pub dry_run: bool,
}

impl BehaviorFlags {
    /// No modifiers
    pub const NONE: Self = Self {
        fast_add: false,
        no_pow_check: false,
        dry_run: false,
    };

    pub fn with_fast_add(mut self) -> Self {
        self.fast_add = true;
        self
    }

    pub fn with_no_pow_check(mut self) -> Self {
        self.no_pow_check = true;
        self
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}
