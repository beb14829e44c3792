//! # Hashing Utilities
//!
//! SHA-256 is the only digest in SIGIL. Block content fingerprints, linkage
//! hashes, and the codec's synthetic IV all come from the two functions in
//! this module, and they all use the same rendering: lowercase hex.
//!
//! ## Why strings?
//!
//! The ledger's hash recipe is defined over the UTF-8 encoding of canonical
//! string forms (see [`crate::storage::block`]), and the digests themselves
//! are stored and compared as hex strings. Returning `String` here keeps
//! every call site on the canonical rendering instead of juggling raw byte
//! arrays that get hex-encoded inconsistently.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of the input and return it as lowercase hex.
///
/// # Example
///
/// ```
/// use sigil_ledger::crypto::sha256_hex;
///
/// let digest = sha256_hex(b"hello");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into the hasher produces the same digest
/// as hashing their concatenation, minus the temporary buffer. Block hashes
/// use this to cover `(index, timestamp, data_hash, previous_hash)` in one
/// pass.
pub fn sha256_hex_multi(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Compute a raw SHA-256 digest as a fixed-size array.
///
/// Used where bytes are needed rather than the hex rendering, e.g. the
/// codec's synthetic nonce derivation.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}
