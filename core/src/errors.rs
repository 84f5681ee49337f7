//! # Errors
//!
//! This module defines errors, returned by the library.

use consensus_lib::chain::{BlockHash, ChainError};
use consensus_lib::params::ParamsError;
use consensus_lib::CompactTarget;
use thiserror::Error;

/// Reasons a header is refused by [`crate::validator::HeaderValidator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderRejection {
    /// The header extends a block that is not in the index.
    #[error("Parent block {0} is unknown")]
    UnknownParent(BlockHash),
    /// The header is already in the index.
    #[error("Block {0} is already known")]
    Duplicate(BlockHash),
    /// Declared bits differ from the ones the difficulty rules require.
    #[error("Incorrect proof-of-work bits: expected {expected}, got {got}")]
    BadDifficultyBits {
        expected: CompactTarget,
        got: CompactTarget,
    },
    /// The block hash does not meet the declared target.
    #[error("Block hash {0} does not satisfy its proof of work")]
    HighHash(BlockHash),
    /// The coinbase is missing a valid network signature.
    #[error("Coinbase of block at height {0} is not signed by the network signer")]
    UnauthorizedCoinbase(u32),
}

/// Errors returned by the node library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// ConfigError is returned when the configuration is invalid
    #[error("ConfigError: {0}")]
    ConfigError(String),
    /// A required environment variable is missing or not unicode
    #[error("Environment variable {0} is not set: {1}")]
    EnvVarNotSet(String, #[source] std::env::VarError),
    /// An environment variable is set but can't be parsed
    #[error("Can't parse environment variable {0}: {1}")]
    EnvVarMalformed(String, String),
    #[error("Invalid consensus parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error("Header rejected: {0}")]
    HeaderRejected(#[from] HeaderRejection),
    #[error("Block index error: {0}")]
    ChainError(#[from] ChainError),
}
