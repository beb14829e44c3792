//! # Ledger Service
//!
//! [`LedgerService`] is the facade the front-end talks to. It owns the
//! shared live chain, composes the persistence layer and the background
//! monitor, and exposes exactly the operations the outer surface needs:
//! append, save, verify, list.
//!
//! ## Ownership & locking
//!
//! The chain lives behind `Arc<parking_lot::RwLock<_>>` with a single
//! logical writer (the foreground append path) and concurrent readers (the
//! monitor, plus foreground verify/display). Appends take the write lock
//! for the O(1) construction + link re-check only; verification and
//! listing take read locks. Nothing holds a lock across an await point.
//!
//! ## Degraded operation
//!
//! A detected violation never crashes the process and is never
//! auto-repaired. [`save`](LedgerService::save) refuses to overwrite a
//! previously valid on-disk copy with inconsistent state; everything else
//! keeps working so the operator can inspect the damage.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::monitor::{IntegrityAlert, IntegrityMonitor, MonitorConfig, MonitorHandle};
use crate::storage::block::Block;
use crate::storage::chain::{Chain, ChainError, IntegrityViolation};
use crate::storage::store::{LedgerStore, StoreError};

/// Errors surfaced by the service facade.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Appending failed (the chain is unchanged).
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// An integrity check failed; the requested operation was refused.
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityViolation),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the front-end gets back from a successful append.
#[derive(Debug, Clone)]
pub struct BlockSummary {
    /// Index of the new block.
    pub index: u64,
    /// Identity hash of the new block.
    pub hash: String,
    /// Canonical creation timestamp of the new block.
    pub timestamp: String,
    /// Result of the full link verification run after the append. `false`
    /// means damage exists elsewhere in the chain; the new block itself is
    /// validly linked and stays appended.
    pub chain_verified: bool,
}

/// Facade composing the chain, its persistence, and the background monitor.
pub struct LedgerService {
    chain: Arc<RwLock<Chain>>,
    store: LedgerStore,
}

impl LedgerService {
    /// Start the service: load the persisted ledger if one exists, fall
    /// back to a fresh genesis-only chain otherwise.
    pub fn open(store: LedgerStore) -> Self {
        let chain = store.load_or_genesis();
        info!(blocks = chain.len(), tip = %chain.tip().hash, "ledger service ready");
        Self {
            chain: Arc::new(RwLock::new(chain)),
            store,
        }
    }

    /// Append a block carrying `data`.
    ///
    /// The append itself re-verifies only the newly added link and is
    /// rejected outright on mismatch, so it can never introduce damage. A
    /// full link verification then runs over the whole chain; its outcome
    /// is reported in the summary rather than rolling back the (validly
    /// linked) new block.
    pub fn add_block(&self, data: impl Into<String>) -> Result<BlockSummary, ServiceError> {
        let mut chain = self.chain.write();
        let block = chain.append(data)?;
        let (index, hash, timestamp) =
            (block.index, block.hash.clone(), block.timestamp.clone());
        let verified = chain.check_links();
        drop(chain);

        match &verified {
            Ok(()) => info!(index, hash = %hash, "block appended"),
            Err(violation) => warn!(
                index,
                violation = %violation,
                "block appended but chain verification failed"
            ),
        }

        Ok(BlockSummary {
            index,
            hash,
            timestamp,
            chain_verified: verified.is_ok(),
        })
    }

    /// Persist the chain, refusing if it fails either integrity check.
    ///
    /// Inconsistent state must never overwrite a previously valid on-disk
    /// copy; a refused save leaves the file exactly as it was.
    pub fn save(&self) -> Result<(), ServiceError> {
        let chain = self.chain.read();
        chain.check_links()?;
        chain.check_blocks()?;
        self.store.save(&chain)?;
        Ok(())
    }

    /// Thin pass-through to link verification, for external callers.
    pub fn check_integrity(&self) -> bool {
        self.chain.read().verify_links()
    }

    /// Snapshot of all blocks, in chain order, for display.
    pub fn blocks(&self) -> Vec<Block> {
        self.chain.read().blocks().to_vec()
    }

    /// Current chain length, genesis included.
    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    /// A service always holds at least the genesis block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Spawn the background integrity monitor against the live chain.
    ///
    /// Returns the task handle and the alert channel the front-end should
    /// listen on. Spawning twice creates two independent monitors.
    pub fn spawn_monitor(
        &self,
        config: MonitorConfig,
    ) -> (MonitorHandle, mpsc::UnboundedReceiver<IntegrityAlert>) {
        let (monitor, alerts) = IntegrityMonitor::new(Arc::clone(&self.chain), config);
        (monitor.spawn(), alerts)
    }

    /// Shared handle to the live chain, for read-only collaborators.
    pub fn chain(&self) -> Arc<RwLock<Chain>> {
        Arc::clone(&self.chain)
    }
}
