//! # Consensus Parameters
//!
//! Per-network constants the difficulty, proof-of-work and coinbase rules
//! depend on. A parameter set is built once, validated, and then passed by
//! reference to every consensus function.

use crate::block_signing::NetworkSignerKey;
use crate::compact::Target;
use crate::epochs::EpochSchedule;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Highest target any network accepts.
pub const FLASHCOIN_POW_LIMIT: Target =
    Target::from_be_hex("7fffff0000000000000000000000000000000000000000000000000000000000");
/// Three and a half days.
pub const FLASHCOIN_POW_TARGET_TIMESPAN: i64 = 7 * 24 * 60 * 60 / 2;
/// Two and a half minutes.
pub const FLASHCOIN_POW_TARGET_SPACING: i64 = 150;

/// The coinbase signer of every Flashcoin network, in mcl's compressed G2
/// encoding.
pub const FLASHCOIN_SIGNER_KEY: &str =
    "84c3ad891b842ca6788bd79e0eb8d06da59fe94acc6a35382f3beee5b9032e17\
     7012ed91d5a4fe5f4fa717d8014cc377847ad5508769719b76d0e93e38a53d94";

static FLASHCOIN_SIGNER: Lazy<NetworkSignerKey> = Lazy::new(|| {
    FLASHCOIN_SIGNER_KEY
        .parse()
        .expect("network signer key is a valid G2 point")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("Target spacing must be positive, got {0}")]
    NonPositiveSpacing(i64),
    #[error("Target timespan {timespan} is shorter than one block spacing ({spacing})")]
    TimespanShorterThanSpacing { timespan: i64, spacing: i64 },
    #[error("Proof-of-work limit must not be zero")]
    ZeroPowLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ParamsError::UnknownNetwork(s.to_string())),
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Consensus rules of one network.
///
/// Fields are public so tests and tools can derive variants of a preset,
/// but a set handed to the consensus functions must pass [`Self::validate`].
pub struct ConsensusParams {
    pub network: Network,
    /// Easiest target any block may declare.
    pub pow_limit: Target,
    /// Seconds one retarget period is expected to take.
    pub pow_target_timespan: i64,
    /// Seconds between blocks the chain aims for.
    pub pow_target_spacing: i64,
    /// Testnet rule: a block arriving more than two spacings after its
    /// parent may use the minimum difficulty.
    pub allow_min_difficulty_blocks: bool,
    /// Never change difficulty; every block repeats its parent's bits.
    pub no_retargeting: bool,
    /// Historical exceptions to the difficulty and PoW rules.
    #[serde(default = "EpochSchedule::flashcoin")]
    pub epochs: EpochSchedule,
    /// Key that authorizes coinbases.
    pub signer_key: NetworkSignerKey,
    /// First height whose coinbase must be signed.
    #[serde(default)]
    pub coinbase_signature_height: u32,
}

impl ConsensusParams {
    pub fn mainnet() -> Self {
        ConsensusParams {
            network: Network::Mainnet,
            pow_limit: FLASHCOIN_POW_LIMIT,
            pow_target_timespan: FLASHCOIN_POW_TARGET_TIMESPAN,
            pow_target_spacing: FLASHCOIN_POW_TARGET_SPACING,
            allow_min_difficulty_blocks: false,
            no_retargeting: true,
            epochs: EpochSchedule::flashcoin(),
            signer_key: *FLASHCOIN_SIGNER,
            coinbase_signature_height: 0,
        }
    }

    pub fn testnet() -> Self {
        ConsensusParams {
            network: Network::Testnet,
            pow_limit: FLASHCOIN_POW_LIMIT,
            pow_target_timespan: FLASHCOIN_POW_TARGET_TIMESPAN,
            pow_target_spacing: FLASHCOIN_POW_TARGET_SPACING,
            allow_min_difficulty_blocks: true,
            no_retargeting: false,
            epochs: EpochSchedule::flashcoin(),
            signer_key: *FLASHCOIN_SIGNER,
            coinbase_signature_height: 0,
        }
    }

    pub fn regtest() -> Self {
        ConsensusParams {
            network: Network::Regtest,
            pow_limit: FLASHCOIN_POW_LIMIT,
            pow_target_timespan: FLASHCOIN_POW_TARGET_TIMESPAN,
            pow_target_spacing: FLASHCOIN_POW_TARGET_SPACING,
            allow_min_difficulty_blocks: true,
            no_retargeting: true,
            epochs: EpochSchedule::flashcoin(),
            signer_key: *FLASHCOIN_SIGNER,
            coinbase_signature_height: 0,
        }
    }

    /// The preset for `network`.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Number of blocks between difficulty retargets.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.pow_target_spacing <= 0 {
            return Err(ParamsError::NonPositiveSpacing(self.pow_target_spacing));
        }
        if self.pow_target_timespan < self.pow_target_spacing {
            return Err(ParamsError::TimespanShorterThanSpacing {
                timespan: self.pow_target_timespan,
                spacing: self.pow_target_spacing,
            });
        }
        if self.pow_limit.is_zero() {
            return Err(ParamsError::ZeroPowLimit);
        }
        Ok(())
    }
}
