//! # Block Structure
//!
//! A block is one immutable entry in the ledger: an opaque text payload
//! plus the fingerprints that chain it to its predecessor.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Block                                           │
//! │  ├── index: u64            (0 = genesis)         │
//! │  ├── timestamp: String     (canonical rendering) │
//! │  ├── data: String          (caller payload)      │
//! │  ├── previous_hash: String ("0" for genesis)     │
//! │  ├── data_hash: String     (SHA-256 of data)     │
//! │  └── hash: String          (block identity)      │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! `data_hash` covers the payload alone. `hash` covers the UTF-8
//! concatenation `index || timestamp || data_hash || previous_hash`, in
//! that fixed field order, and is the block's identity in the chain: the
//! successor's `previous_hash` is this string verbatim.
//!
//! ## Timestamps
//!
//! The timestamp is stored as its canonical rendered string (see
//! [`TIMESTAMP_FORMAT_V1`]) and that exact string is what gets hashed and
//! persisted. Parsing is offered for display; nothing ever re-renders a
//! parsed value back into a block.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{GENESIS_DATA, GENESIS_PREVIOUS_HASH, TIMESTAMP_FORMAT_V1};
use crate::crypto::hash::{sha256_hex, sha256_hex_multi};

/// Render an instant in the canonical ledger timestamp format.
pub fn canonical_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT_V1).to_string()
}

/// Parse a canonical ledger timestamp back into a `DateTime<Utc>`.
///
/// Returns `None` for strings not produced by [`canonical_timestamp`].
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT_V1)
        .ok()
        .map(|naive| naive.and_utc())
}

/// One immutable ledger entry.
///
/// Blocks are constructed through [`Block::genesis`] and [`Block::next`]
/// and never mutated afterwards. The stored `data_hash` and `hash` are
/// exactly what verification recomputes via [`Block::compute_data_hash`]
/// and [`Block::compute_hash`]; any divergence means tampering.
///
/// Field order matters: it is both the hash recipe order and the
/// serialization order of the persisted file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, strictly increasing by 1 from the
    /// predecessor. 0 is reserved for genesis.
    pub index: u64,
    /// Canonical rendering of the creation instant. Assigned once, never
    /// re-rendered.
    pub timestamp: String,
    /// Opaque caller payload.
    pub data: String,
    /// The predecessor's `hash`, verbatim. `"0"` for genesis.
    pub previous_hash: String,
    /// SHA-256 hex of `data`'s UTF-8 bytes.
    pub data_hash: String,
    /// SHA-256 hex over `index || timestamp || data_hash || previous_hash`.
    pub hash: String,
}

impl Block {
    /// Construct the genesis block: index 0, current timestamp, the fixed
    /// sentinel payload, and the `"0"` predecessor sentinel.
    ///
    /// Because the timestamp is real, two genesis blocks created at
    /// different instants have different hashes. A ledger's identity is
    /// born with its genesis block.
    pub fn genesis() -> Self {
        Self::assemble(
            0,
            canonical_timestamp(Utc::now()),
            GENESIS_DATA.to_string(),
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// Construct the successor of `previous` carrying `data`.
    ///
    /// Index increments by one, the timestamp is freshly rendered, and
    /// `previous_hash` is copied from the predecessor's identity. The
    /// predecessor is taken by reference, so there is no such thing as a
    /// successor without one.
    pub fn next(previous: &Block, data: impl Into<String>) -> Self {
        Self::assemble(
            previous.index + 1,
            canonical_timestamp(Utc::now()),
            data.into(),
            previous.hash.clone(),
        )
    }

    /// Assemble a block from its primary fields, computing both digests.
    /// The single place where `data_hash` and `hash` are ever written.
    fn assemble(index: u64, timestamp: String, data: String, previous_hash: String) -> Self {
        let data_hash = sha256_hex(data.as_bytes());
        let hash = sha256_hex_multi(&[
            index.to_string().as_bytes(),
            timestamp.as_bytes(),
            data_hash.as_bytes(),
            previous_hash.as_bytes(),
        ]);
        Self {
            index,
            timestamp,
            data,
            previous_hash,
            data_hash,
            hash,
        }
    }

    /// Recompute the payload digest from the current `data` field.
    ///
    /// Pure; compares against the stored `data_hash` during verification.
    pub fn compute_data_hash(&self) -> String {
        sha256_hex(self.data.as_bytes())
    }

    /// Recompute the block identity from the current fields.
    ///
    /// Covers `index || timestamp || data_hash || previous_hash` using the
    /// STORED `data_hash`, mirroring construction: a tampered payload is
    /// caught by [`compute_data_hash`](Self::compute_data_hash), a tampered
    /// header by this function.
    pub fn compute_hash(&self) -> String {
        sha256_hex_multi(&[
            self.index.to_string().as_bytes(),
            self.timestamp.as_bytes(),
            self.data_hash.as_bytes(),
            self.previous_hash.as_bytes(),
        ])
    }

    /// `true` for the chain's first block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// The creation instant, if the stored timestamp parses canonically.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}
