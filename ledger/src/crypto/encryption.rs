//! # AES-256-GCM Sealing
//!
//! Authenticated encryption for the persisted ledger file. AES-GCM gives us
//! encryption and tamper authentication in one operation: a ciphertext that
//! was modified on disk, truncated, or produced under a different key fails
//! to open, full stop. The chain's own hash verification then covers the
//! window the cipher cannot see (tampering before save or after load).
//!
//! ## Wire format
//!
//! `nonce || ciphertext` as a single buffer. The first 12 bytes are the
//! nonce, the rest is the ciphertext with the 16-byte GCM tag appended by
//! the cipher itself. [`decrypt`] expects exactly this layout.
//!
//! ## Nonce management
//!
//! GCM is unforgiving about nonce reuse under the same key. [`encrypt`]
//! draws a random 96-bit nonce from the OS CSPRNG; the codec instead calls
//! [`encrypt_with_nonce`] with a synthetic IV derived from key and
//! plaintext, which keeps encoding deterministic while only ever reusing a
//! nonce for a byte-identical plaintext (yielding a byte-identical
//! ciphertext, an equality leak and nothing more).

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH};

/// Errors that can occur during sealing/opening.
///
/// Deliberately vague: the difference between "wrong key" and "corrupted
/// ciphertext" is not observable from the outside, and we keep it that way.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,
}

/// Encrypt plaintext with AES-256-GCM under a random nonce.
///
/// Returns `nonce || ciphertext`. Two calls with identical inputs produce
/// different outputs; use [`encrypt_with_nonce`] when determinism matters.
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let mut nonce = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    encrypt_with_nonce(key, &nonce, plaintext)
}

/// Encrypt plaintext with AES-256-GCM under a caller-supplied nonce.
///
/// The caller owns nonce discipline: under a given key, a nonce may only
/// recur for an identical plaintext. The codec satisfies this by deriving
/// the nonce from the plaintext itself.
pub fn encrypt_with_nonce(
    key: &[u8; AES_KEY_LENGTH],
    nonce_bytes: &[u8; AES_NONCE_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    // Pack nonce || ciphertext so the caller never manages the nonce
    // separately.
    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data previously produced by [`encrypt`] or [`encrypt_with_nonce`].
///
/// # Errors
///
/// [`EncryptionError::DecryptFailed`] when the key is wrong or the
/// ciphertext was modified in any way (bit flip, truncation past the nonce,
/// reordering). No partial plaintext is ever returned.
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::DecryptFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AES_TAG_LENGTH;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"the quick brown fox jumps over the lazy dog";

        let sealed = encrypt(&key, plaintext).unwrap();
        let recovered = decrypt(&key, &sealed).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let key = test_key();
        let sealed = encrypt(&key, b"secret").unwrap();

        let mut wrong_key = test_key();
        wrong_key[0] ^= 0xFF;

        assert!(decrypt(&wrong_key, &sealed).is_err());
    }

    #[test]
    fn modified_ciphertext_fails_decryption() {
        let key = test_key();
        let mut sealed = encrypt(&key, b"secret").unwrap();
        // Corrupt a byte past the nonce prefix.
        sealed[AES_NONCE_LENGTH] ^= 0xFF;

        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn truncated_ciphertext_fails_decryption() {
        let key = test_key();
        let sealed = encrypt(&key, b"secret").unwrap();
        assert!(decrypt(&key, &sealed[..sealed.len() - 1]).is_err());
    }

    #[test]
    fn random_nonces_are_unique() {
        let key = test_key();
        let sealed1 = encrypt(&key, b"message").unwrap();
        let sealed2 = encrypt(&key, b"message").unwrap();
        assert_ne!(&sealed1[..AES_NONCE_LENGTH], &sealed2[..AES_NONCE_LENGTH]);
    }

    #[test]
    fn fixed_nonce_is_deterministic() {
        let key = test_key();
        let nonce = [7u8; AES_NONCE_LENGTH];
        let a = encrypt_with_nonce(&key, &nonce, b"same input").unwrap();
        let b = encrypt_with_nonce(&key, &nonce, b"same input").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sealed_length_is_nonce_plus_plaintext_plus_tag() {
        let key = test_key();
        let plaintext = b"exactly 26 bytes of input!";
        let sealed = encrypt(&key, plaintext).unwrap();
        assert_eq!(sealed.len(), AES_NONCE_LENGTH + plaintext.len() + AES_TAG_LENGTH);
    }

    #[test]
    fn decrypt_too_short_input() {
        let key = test_key();
        assert!(matches!(
            decrypt(&key, &[0u8; 4]),
            Err(EncryptionError::CiphertextTooShort)
        ));
    }
}
