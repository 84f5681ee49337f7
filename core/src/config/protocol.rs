use crate::errors::CoreError;
use consensus_lib::params::{ConsensusParams, Network};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default location of the consensus parameter file used by
/// [`ConsensusParamsetName::File`].
pub const DEFAULT_CONSENSUS_CONFIG_PATH: &str = "consensus_params.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// A pre-defined paramset name that can be converted into a
/// [`ConsensusParams`]. Refers to one of the network presets or to an
/// external source.
pub enum ConsensusParamsetName {
    Mainnet,
    Testnet,
    Regtest,
    /// Explicitly read from environment variables and exit with error if not set
    Env,
    /// Read from external config file and exit with error if not set
    File,
}

impl FromStr for ConsensusParamsetName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(ConsensusParamsetName::Mainnet),
            "testnet" => Ok(ConsensusParamsetName::Testnet),
            "regtest" => Ok(ConsensusParamsetName::Regtest),
            "env" => Ok(ConsensusParamsetName::Env),
            "file" => Ok(ConsensusParamsetName::File),
            _ => Err(CoreError::ConfigError(format!(
                "Unknown paramset name: {}",
                s
            ))),
        }
    }
}

impl Display for ConsensusParamsetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusParamsetName::Mainnet => write!(f, "mainnet"),
            ConsensusParamsetName::Testnet => write!(f, "testnet"),
            ConsensusParamsetName::Regtest => write!(f, "regtest"),
            ConsensusParamsetName::Env => write!(f, "env"),
            ConsensusParamsetName::File => write!(f, "file"),
        }
    }
}

impl ConsensusParamsetName {
    /// Resolves the name into a validated parameter set.
    ///
    /// `File` reads the path in `CONSENSUS_CONFIG_PATH`, falling back to
    /// [`DEFAULT_CONSENSUS_CONFIG_PATH`].
    pub fn load(self) -> Result<ConsensusParams, CoreError> {
        let params = match self {
            ConsensusParamsetName::Mainnet => ConsensusParams::for_network(Network::Mainnet),
            ConsensusParamsetName::Testnet => ConsensusParams::for_network(Network::Testnet),
            ConsensusParamsetName::Regtest => ConsensusParams::for_network(Network::Regtest),
            ConsensusParamsetName::Env => super::env::consensus_params_from_env()?,
            ConsensusParamsetName::File => {
                let path = std::env::var("CONSENSUS_CONFIG_PATH")
                    .unwrap_or_else(|_| DEFAULT_CONSENSUS_CONFIG_PATH.to_string());
                from_toml_file(path)?
            }
        };

        params.validate()?;
        tracing::debug!(paramset = %self, network = %params.network, "Loaded consensus parameters");

        Ok(params)
    }
}

/// Reads a parameter set from a TOML file. The result is not validated.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<ConsensusParams, CoreError> {
    let path = path.as_ref();
    tracing::trace!("Using consensus parameter file: {:?}", path);

    let contents = fs::read_to_string(path).map_err(|e| {
        CoreError::ConfigError(format!(
            "Can't read consensus parameter file {:?}: {}",
            path, e
        ))
    })?;

    toml::from_str(&contents).map_err(|e| CoreError::ConfigError(e.to_string()))
}
