//! # Chain Codec
//!
//! Turns a [`Chain`] into sealed bytes and back: canonical JSON (an ordered
//! list of block records, field order fixed by the `Block` declaration)
//! encrypted with AES-256-GCM under the key supplied by a
//! [`KeyProvider`](crate::keys::KeyProvider).
//!
//! ## Determinism
//!
//! Encoding is a pure function of chain content and key. The JSON rendering
//! is canonical, and instead of a random nonce the codec derives a
//! synthetic IV from `SHA-256(key || plaintext)`. A nonce therefore only
//! ever recurs for a byte-identical plaintext, which produces a
//! byte-identical ciphertext: an equality leak, acceptable for a local
//! single-key ledger file, in exchange for byte-level reproducibility of
//! `encode`.
//!
//! ## Verbatim decoding
//!
//! `decode` restores every stored field, `data_hash` and `hash` included,
//! without recomputing anything. Loading must reproduce exactly what was
//! saved so that the post-load verification pass can see tampering the
//! cipher's authentication did not (i.e. anything that happened before
//! sealing or after opening).

use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH};
use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::hash::sha256_array;
use crate::keys::{KeyError, KeyProvider};

use super::block::Block;
use super::chain::{Chain, ChainError};

/// Errors from encoding/decoding a persisted chain.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Sealing the serialized chain failed.
    #[error("failed to seal ledger payload")]
    Encrypt(#[source] EncryptionError),

    /// Opening the sealed bytes failed: wrong or missing key, or the
    /// ciphertext was modified. No partial plaintext escapes.
    #[error("failed to open ledger payload -- wrong key or corrupted file")]
    Decrypt(#[source] EncryptionError),

    /// The decrypted plaintext is not a valid block record list.
    #[error("malformed ledger payload")]
    MalformedJson(#[source] serde_json::Error),

    /// The records parsed but violate chain structure (empty list,
    /// non-contiguous indices).
    #[error("malformed ledger structure")]
    MalformedStructure(#[source] ChainError),
}

/// Chain ⇄ sealed bytes.
///
/// Holds the resolved symmetric key for the process lifetime; key file I/O
/// happens once, at construction.
#[derive(Clone)]
pub struct Codec {
    key: [u8; AES_KEY_LENGTH],
}

impl Codec {
    /// Build a codec around an already-resolved key.
    pub fn new(key: [u8; AES_KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Build a codec by resolving the key through a provider, creating the
    /// key on first use.
    pub fn from_provider(provider: &dyn KeyProvider) -> Result<Self, KeyError> {
        Ok(Self::new(provider.load_or_create()?))
    }

    /// Render the chain to canonical JSON and seal it.
    ///
    /// Deterministic: identical chain content and key always yield
    /// identical bytes.
    pub fn encode(&self, chain: &Chain) -> Result<Vec<u8>, CodecError> {
        let plaintext =
            serde_json::to_vec(chain.blocks()).map_err(CodecError::MalformedJson)?;
        let nonce = self.derive_nonce(&plaintext);
        encryption::encrypt_with_nonce(&self.key, &nonce, &plaintext)
            .map_err(CodecError::Encrypt)
    }

    /// Open sealed bytes and rebuild the chain, restoring all stored
    /// fields verbatim.
    pub fn decode(&self, data: &[u8]) -> Result<Chain, CodecError> {
        let plaintext = encryption::decrypt(&self.key, data).map_err(CodecError::Decrypt)?;
        let blocks: Vec<Block> =
            serde_json::from_slice(&plaintext).map_err(CodecError::MalformedJson)?;
        Chain::from_blocks(blocks).map_err(CodecError::MalformedStructure)
    }

    /// Synthetic IV: the first 12 bytes of `SHA-256(key || plaintext)`.
    /// Recurs only when both key and plaintext recur.
    fn derive_nonce(&self, plaintext: &[u8]) -> [u8; AES_NONCE_LENGTH] {
        let mut preimage = Vec::with_capacity(self.key.len() + plaintext.len());
        preimage.extend_from_slice(&self.key);
        preimage.extend_from_slice(plaintext);
        let digest = sha256_array(&preimage);

        let mut nonce = [0u8; AES_NONCE_LENGTH];
        nonce.copy_from_slice(&digest[..AES_NONCE_LENGTH]);
        nonce
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The key stays out of debug output.
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}
