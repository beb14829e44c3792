//! Cryptographic primitives for the ledger: SHA-256 fingerprints and
//! AES-256-GCM sealing of the persisted file.
//!
//! Nothing in here is novel, which is exactly the point. Hashing goes
//! through [`hash`], encryption through [`encryption`], and no other module
//! touches a cipher or digest directly.

pub mod encryption;
pub mod hash;

pub use encryption::{decrypt, encrypt, EncryptionError};
pub use hash::{sha256_hex, sha256_hex_multi};
