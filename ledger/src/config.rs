//! # Ledger Configuration & Constants
//!
//! Every magic number in SIGIL lives here. Hash recipes, genesis sentinels,
//! the timestamp rendering, and the monitor cadence are all part of the
//! on-disk contract: changing any of them invalidates every previously
//! saved ledger file, so treat this module as versioned.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// AES-256-GCM for the sealed ledger file. 256-bit keys, 96-bit nonces,
/// 128-bit authentication tags.
pub const SYMMETRIC_ALGORITHM: &str = "AES-256-GCM";

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits is the standard GCM nonce
/// size and the only one we use.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// The digest used for block content and linkage fingerprints.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Digest output length in bytes. SHA-256 produces a 32-byte digest,
/// rendered as 64 lowercase hex characters everywhere in the ledger.
pub const DIGEST_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Genesis Sentinels
// ---------------------------------------------------------------------------

/// Payload carried by the genesis block. Purely a label; its `data_hash`
/// is computed like any other block's.
pub const GENESIS_DATA: &str = "Genesis Block";

/// The `previous_hash` sentinel for the genesis block, which has no real
/// predecessor. A literal `"0"`, not a zeroed digest, so it can never
/// collide with an actual SHA-256 hex rendering.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

// ---------------------------------------------------------------------------
// Timestamp Rendering
// ---------------------------------------------------------------------------

/// Canonical timestamp format, version 1: UTC, RFC3339-style, fixed
/// microsecond precision, trailing `Z`.
///
/// The rendered string is what gets hashed AND what gets persisted. A block
/// stores the string itself and nothing ever re-renders a parsed value, so
/// hashes cannot drift across save/reload. Locale plays no part.
pub const TIMESTAMP_FORMAT_V1: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

// ---------------------------------------------------------------------------
// Integrity Monitor
// ---------------------------------------------------------------------------

/// Default interval between background verification passes.
///
/// Each pass is O(n) in chain length; at this system's intended scale a
/// pass finishes long before the next tick.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Default File Names
// ---------------------------------------------------------------------------

/// Default file name for the sealed ledger.
pub const DEFAULT_LEDGER_FILE: &str = "ledger.sealed";

/// Default file name for the symmetric key blob.
pub const DEFAULT_KEY_FILE: &str = "secret.key";
