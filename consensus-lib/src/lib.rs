//! # Consensus-lib
//! Consensus rules of the Flashcoin chain: compact target encoding,
//! difficulty adjustment, proof-of-work validation and coinbase signature
//! verification. Everything here is deterministic and free of I/O.

pub mod block_signing;
pub mod chain;
pub mod common;
pub mod compact;
pub mod difficulty;
pub mod epochs;
pub mod mining;
pub mod params;
pub mod pow;

pub use block_signing::{
    build_message, check_coinbase_authorization, verify_coinbase_signature, NetworkSignerKey,
};
pub use chain::{BlockArena, BlockHash, BlockHeader, BlockId, BlockIndex, ChainHistory};
pub use compact::{CompactTarget, Target};
pub use difficulty::{calculate_next_work, next_required_target};
pub use params::{ConsensusParams, Network};
pub use pow::check_proof_of_work;
