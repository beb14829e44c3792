//! Ledger storage: the block/chain data model, the sealed-bytes codec, and
//! file persistence.
//!
//! `block` and `chain` define the in-memory model and its verification;
//! `codec` maps a chain to encrypted bytes and back; `store` owns the file
//! on disk. Only `store` performs I/O.

pub mod block;
pub mod chain;
pub mod codec;
pub mod store;

pub use block::Block;
pub use chain::{Chain, ChainError, IntegrityViolation};
pub use codec::{Codec, CodecError};
pub use store::{LedgerStore, StoreError};
