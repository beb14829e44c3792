//! # Ledger File Persistence
//!
//! [`LedgerStore`] owns the on-disk location of the sealed ledger and the
//! codec that seals it. Durability is explicit: nothing is written except
//! through [`save`](LedgerStore::save).
//!
//! An absent file is not an error condition for startup -- it means "first
//! run", and [`load_or_genesis`](LedgerStore::load_or_genesis) recovers it
//! silently with a fresh genesis chain. A file that exists but fails to
//! open (foreign key, corruption) is logged and likewise falls back to a
//! fresh chain; the damaged file stays on disk untouched for inspection
//! until the next successful save overwrites it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::chain::Chain;
use super::codec::{Codec, CodecError};

/// Errors from loading/saving the sealed ledger file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No persisted ledger exists yet. Callers treat this as "start a
    /// fresh chain", not as a failure.
    #[error("no persisted ledger at {path}")]
    NotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// Reading or writing the ledger file failed.
    #[error("ledger file I/O failed for {path}: {source}")]
    Io {
        /// Path of the file involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but could not be decoded (wrong key, corruption,
    /// malformed content).
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// File-backed persistence for a single sealed ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    codec: Codec,
}

impl LedgerStore {
    /// Create a store for the given file path and codec.
    pub fn new(path: impl Into<PathBuf>, codec: Codec) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    /// The ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seal the chain and write it to disk, replacing any previous file.
    pub fn save(&self, chain: &Chain) -> Result<(), StoreError> {
        let sealed = self.codec.encode(chain)?;
        std::fs::write(&self.path, &sealed).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(
            path = %self.path.display(),
            blocks = chain.len(),
            bytes = sealed.len(),
            "ledger saved"
        );
        Ok(())
    }

    /// Read and open the persisted ledger.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no file exists; [`StoreError::Codec`]
    /// when the file cannot be opened or parsed.
    pub fn load(&self) -> Result<Chain, StoreError> {
        let sealed = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        Ok(self.codec.decode(&sealed)?)
    }

    /// Load the persisted ledger, falling back to a fresh genesis-only
    /// chain when none exists or the existing file cannot be opened.
    ///
    /// The fallback on decode failure is deliberate: the process keeps
    /// operating on a fresh chain while the unreadable file remains on
    /// disk for the operator.
    pub fn load_or_genesis(&self) -> Chain {
        match self.load() {
            Ok(chain) => {
                info!(
                    path = %self.path.display(),
                    blocks = chain.len(),
                    "ledger loaded"
                );
                chain
            }
            Err(StoreError::NotFound { .. }) => {
                info!(path = %self.path.display(), "no persisted ledger, starting fresh");
                Chain::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "persisted ledger unreadable, starting fresh"
                );
                Chain::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &tempfile::TempDir) -> LedgerStore {
        LedgerStore::new(dir.path().join("ledger.sealed"), Codec::new([3u8; 32]))
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let mut chain = Chain::new();
        chain.append("A").unwrap();
        store.save(&chain).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, chain);
        assert!(loaded.verify_links());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        assert!(matches!(store.load(), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn load_or_genesis_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let chain = test_store(&dir).load_or_genesis();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.tip().index, 0);
    }

    #[test]
    fn load_or_genesis_survives_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        std::fs::write(store.path(), b"definitely not a sealed ledger").unwrap();

        let chain = store.load_or_genesis();
        assert_eq!(chain.len(), 1);
        // The unreadable file is left in place for inspection.
        assert!(store.path().exists());
    }

    #[test]
    fn foreign_key_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.sealed");

        let chain = Chain::new();
        LedgerStore::new(&path, Codec::new([1u8; 32]))
            .save(&chain)
            .unwrap();

        let foreign = LedgerStore::new(&path, Codec::new([2u8; 32]));
        assert!(matches!(foreign.load(), Err(StoreError::Codec(_))));
    }

    #[test]
    fn save_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let mut chain = Chain::new();
        store.save(&chain).unwrap();
        chain.append("A").unwrap();
        store.save(&chain).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }
}
