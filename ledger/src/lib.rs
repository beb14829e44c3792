// Copyright (c) 2026 Sigil Systems. MIT License.
// See LICENSE for details.

//! # SIGIL — Core Library
//!
//! A tamper-evident encrypted ledger for a single process and a single
//! writer. Records go into an append-only, hash-linked chain of blocks;
//! the chain persists to disk as one AES-256-GCM-sealed JSON file; a
//! background task keeps re-verifying the live chain and raises an alert
//! the moment any block stops matching its fingerprints.
//!
//! This is deliberately NOT a blockchain in the distributed sense: no
//! consensus, no peers, no proof-of-work. Just linked hashes doing the one
//! thing they are genuinely good at: making silent mutation impossible.
//!
//! ## Architecture
//!
//! - **config** — every constant of the on-disk and hashing contract.
//! - **crypto** — SHA-256 fingerprints and AES-256-GCM sealing.
//! - **keys** — the `KeyProvider` seam; file-backed or fixed in-memory.
//! - **storage** — `Block` and `Chain` (the model and its verification),
//!   the codec (chain ⇄ sealed bytes), and the file store.
//! - **monitor** — the periodic background verification task.
//! - **service** — the `LedgerService` facade the front-end calls.
//!
//! ## Trust model
//!
//! The cipher authenticates the file at rest; the hash chain authenticates
//! the content across its whole life, including in memory and across
//! save/load cycles. Verification always recomputes from raw fields and
//! compares against what construction recorded. Nothing is ever repaired
//! automatically — a violation is surfaced and left for the operator.

pub mod config;
pub mod crypto;
pub mod keys;
pub mod monitor;
pub mod service;
pub mod storage;

pub use keys::{FileKeyProvider, KeyProvider, StaticKey};
pub use monitor::{IntegrityAlert, IntegrityMonitor, MonitorConfig, MonitorHandle, MonitorState};
pub use service::{BlockSummary, LedgerService, ServiceError};
pub use storage::{Block, Chain, ChainError, Codec, IntegrityViolation, LedgerStore};
