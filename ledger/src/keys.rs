//! # Key Provisioning
//!
//! The codec needs a stable 32-byte AES key. Where that key comes from is
//! deliberately behind a trait so the ledger core never touches the
//! filesystem for secrets directly and tests can substitute a fixed
//! in-memory key.
//!
//! Two providers ship with the crate:
//!
//! - [`FileKeyProvider`] — the production path. Reads an opaque 32-byte
//!   blob from disk, generating one from the OS CSPRNG and persisting it
//!   on first use. Losing this file means losing every ledger sealed under
//!   it; there is no recovery path.
//! - [`StaticKey`] — a fixed key for tests and embedding scenarios.

use std::path::{Path, PathBuf};

use rand::RngCore;
use thiserror::Error;
use tracing::info;

use crate::config::AES_KEY_LENGTH;

/// Errors that can occur while provisioning a key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Reading or writing the key file failed.
    #[error("key file I/O failed for {path}: {source}")]
    Io {
        /// Path of the key file involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The on-disk blob is not a valid key.
    #[error("key file has invalid length: expected {AES_KEY_LENGTH} bytes, found {actual}")]
    InvalidLength {
        /// Actual byte length found on disk.
        actual: usize,
    },
}

/// Source of the symmetric encryption key consumed by the codec.
///
/// `load_or_create` must be stable: repeated calls return the same key for
/// the lifetime of the provider, or every save/load cycle would silently
/// produce undecryptable files.
pub trait KeyProvider {
    /// Return the 32-byte symmetric key, creating and persisting one if
    /// none exists yet.
    fn load_or_create(&self) -> Result<[u8; AES_KEY_LENGTH], KeyError>;
}

// ---------------------------------------------------------------------------
// FileKeyProvider
// ---------------------------------------------------------------------------

/// Loads the key from a local file, generating it on first use.
///
/// The file holds the raw 32 key bytes, nothing else. No passphrase, no
/// derivation, no header; it is an opaque secret blob whose protection is
/// delegated to filesystem permissions.
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    path: PathBuf,
}

impl FileKeyProvider {
    /// Create a provider backed by the given key file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing key file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> KeyError {
        KeyError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyProvider for FileKeyProvider {
    fn load_or_create(&self) -> Result<[u8; AES_KEY_LENGTH], KeyError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let key: [u8; AES_KEY_LENGTH] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| KeyError::InvalidLength { actual: bytes.len() })?;
                Ok(key)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut key = [0u8; AES_KEY_LENGTH];
                rand::rngs::OsRng.fill_bytes(&mut key);
                std::fs::write(&self.path, key).map_err(|e| self.io_err(e))?;
                info!(path = %self.path.display(), "generated new ledger key file");
                Ok(key)
            }
            Err(e) => Err(self.io_err(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticKey
// ---------------------------------------------------------------------------

/// A fixed in-memory key. No I/O, no state.
#[derive(Debug, Clone)]
pub struct StaticKey(pub [u8; AES_KEY_LENGTH]);

impl KeyProvider for StaticKey {
    fn load_or_create(&self) -> Result<[u8; AES_KEY_LENGTH], KeyError> {
        Ok(self.0)
    }
}
