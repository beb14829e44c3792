//! # Chain Management
//!
//! The [`Chain`] owns the ordered block sequence and everything that can be
//! said about its integrity. It grows only through [`Chain::append`], never
//! shrinks, never reorders.
//!
//! ## Two complementary checks
//!
//! - [`check_links`](Chain::check_links) walks adjacent pairs: linkage
//!   (`previous_hash` against the predecessor's `hash`) plus both digest
//!   recomputations for each non-genesis block.
//! - [`check_blocks`](Chain::check_blocks) independently re-verifies every
//!   block's own `hash`, genesis included. It catches corruption that
//!   preserves the links but rewrites content, which pair-walking alone can
//!   miss for block 0.
//!
//! Run both; the [`IntegrityMonitor`](crate::monitor::IntegrityMonitor)
//! does.

use thiserror::Error;

use super::block::Block;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A detected mismatch between a block's recorded fingerprints and their
/// recomputation. Never auto-repaired; surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    /// `blocks[index].previous_hash` does not equal `blocks[index-1].hash`.
    #[error("block {index}: previous_hash does not match predecessor's hash")]
    BrokenLink {
        /// Index of the block whose back-link is wrong.
        index: u64,
    },

    /// The stored `data_hash` does not match the recomputed payload digest.
    #[error("block {index}: data_hash does not match its payload")]
    DataHashMismatch {
        /// Index of the offending block.
        index: u64,
    },

    /// The stored `hash` does not match the recomputed block identity.
    #[error("block {index}: hash does not match its fields")]
    HashMismatch {
        /// Index of the offending block.
        index: u64,
    },
}

/// Errors from chain construction and mutation.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A decoded record list contained no blocks. A chain without a genesis
    /// block is not a chain.
    #[error("cannot build a chain from zero blocks")]
    Empty,

    /// Decoded records are not a contiguous 0..n index sequence.
    #[error("non-contiguous chain: expected index {expected}, found {found}")]
    NonContiguous {
        /// The index required at this position.
        expected: u64,
        /// The index actually present.
        found: u64,
    },

    /// A freshly appended block failed its own link re-check. The block is
    /// NOT retained; a chain that was healthy before the append stays
    /// healthy after it.
    #[error("appended block failed link verification: {0}")]
    LinkMismatch(#[source] IntegrityViolation),
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// The full ordered ledger: genesis at position 0, strictly contiguous
/// indices, append-only.
///
/// Deliberately not serializable as a whole: persisted form is the block
/// record list, and rebuilding from it must pass through
/// [`Chain::from_blocks`] so structure is always validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Start a fresh ledger containing only a new genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Rebuild a chain from decoded records.
    ///
    /// Validates structure only: non-empty, genesis at position 0,
    /// contiguous indices. Hash fields are restored verbatim and NOT
    /// recomputed here, so that a post-load [`check_links`](Self::check_links)
    /// / [`check_blocks`](Self::check_blocks) pass detects tampering that
    /// happened to the file between save and load.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::Empty);
        }
        for (position, block) in blocks.iter().enumerate() {
            let expected = position as u64;
            if block.index != expected {
                return Err(ChainError::NonContiguous {
                    expected,
                    found: block.index,
                });
            }
        }
        Ok(Self { blocks })
    }

    /// Append a new block carrying `data` and return a reference to it.
    ///
    /// The freshly built block is re-verified against the tip before being
    /// retained: back-link, payload digest, and identity digest, an O(1)
    /// check. On mismatch the block is dropped and
    /// [`ChainError::LinkMismatch`] is returned, so a known-bad block never
    /// enters the chain.
    pub fn append(&mut self, data: impl Into<String>) -> Result<&Block, ChainError> {
        // Genesis always exists, so the tip always exists.
        let tip = self
            .blocks
            .last()
            .expect("chain invariant: genesis always present");
        let block = Block::next(tip, data);

        if let Err(violation) = Self::verify_pair(Some(tip), &block) {
            return Err(ChainError::LinkMismatch(violation));
        }

        self.blocks.push(block);
        Ok(self.blocks.last().expect("block just pushed"))
    }

    /// The most recently appended block.
    pub fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain invariant: genesis always present")
    }

    /// Number of blocks, genesis included. Never zero.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A chain is never empty; provided for clippy's sake.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// Walk every adjacent pair and report the first violation: back-link,
    /// payload digest, and identity digest of each non-genesis block.
    ///
    /// Read-only; a chain of length <= 1 is trivially valid.
    pub fn check_links(&self) -> Result<(), IntegrityViolation> {
        for pair in self.blocks.windows(2) {
            Self::verify_pair(Some(&pair[0]), &pair[1])?;
        }
        Ok(())
    }

    /// Independently re-check every block's own `hash`, genesis included.
    ///
    /// Complementary to [`check_links`](Self::check_links): it has no
    /// notion of linkage, but covers blocks the pair walk treats only as a
    /// predecessor.
    pub fn check_blocks(&self) -> Result<(), IntegrityViolation> {
        for block in &self.blocks {
            if block.hash != block.compute_hash() {
                return Err(IntegrityViolation::HashMismatch { index: block.index });
            }
        }
        Ok(())
    }

    /// Boolean form of [`check_links`](Self::check_links).
    pub fn verify_links(&self) -> bool {
        self.check_links().is_ok()
    }

    /// Boolean form of [`check_blocks`](Self::check_blocks).
    pub fn verify_self_consistency(&self) -> bool {
        self.check_blocks().is_ok()
    }

    /// Verify one block against its (optional) predecessor.
    fn verify_pair(previous: Option<&Block>, block: &Block) -> Result<(), IntegrityViolation> {
        if let Some(previous) = previous {
            if block.previous_hash != previous.hash {
                return Err(IntegrityViolation::BrokenLink { index: block.index });
            }
        }
        if block.data_hash != block.compute_data_hash() {
            return Err(IntegrityViolation::DataHashMismatch { index: block.index });
        }
        if block.hash != block.compute_hash() {
            return Err(IntegrityViolation::HashMismatch { index: block.index });
        }
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit-test support: simulated external tampering.
///
/// Integration tests carry their own copy of this helper, since test-only
/// items are not compiled into the library they link against.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::Chain;

    /// Rewrites one block's payload in a shared live chain without
    /// recomputing digests, the way external tampering would.
    pub(crate) fn tamper_block_data(chain: &Arc<RwLock<Chain>>, index: usize, data: &str) {
        let mut guard = chain.write();
        let mut blocks = guard.blocks().to_vec();
        blocks[index].data = data.to_string();
        *guard = Chain::from_blocks(blocks).expect("structurally valid");
    }
}
