//! # Configuration Options
//!
//! This module defines configuration options.
//!
//! ## Configuration File
//!
//! Configuration options can be read from a TOML file. File contents are
//! described in `NodeConfig` struct. The consensus rules themselves are
//! selected by name, see [`protocol::ConsensusParamsetName`].

use crate::errors::CoreError;
use crate::utils::parse_log_level;
use consensus_lib::params::ConsensusParams;
use protocol::ConsensusParamsetName;
use serde::Deserialize;
use std::{fs::File, io::Read, path::PathBuf};
use tracing::level_filters::LevelFilter;

pub mod env;
pub mod protocol;

/// Configuration options for anything that validates Flashcoin headers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Consensus paramset to validate against.
    pub paramset: ConsensusParamsetName,
    /// Default log level, overridable through `RUST_LOG`.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl NodeConfig {
    /// Create a new `NodeConfig` with default values.
    pub fn new() -> Self {
        NodeConfig {
            paramset: ConsensusParamsetName::Mainnet,
            log_level: None,
        }
    }

    /// Loads and validates the selected consensus parameters.
    pub fn consensus_params(&self) -> Result<ConsensusParams, CoreError> {
        self.paramset.load()
    }

    pub fn log_level_filter(&self) -> Result<Option<LevelFilter>, CoreError> {
        self.log_level.as_deref().map(parse_log_level).transpose()
    }

    /// Read contents of a TOML file and generate a `NodeConfig`.
    pub fn try_parse_file(path: PathBuf) -> Result<Self, CoreError> {
        let mut contents = String::new();

        let mut file = match File::open(path.clone()) {
            Ok(f) => f,
            Err(e) => return Err(CoreError::ConfigError(e.to_string())),
        };

        if let Err(e) = file.read_to_string(&mut contents) {
            return Err(CoreError::ConfigError(e.to_string()));
        }

        tracing::trace!("Using configuration file: {:?}", path);

        NodeConfig::try_parse_from(contents)
    }

    /// Try to parse a `NodeConfig` from given TOML formatted string and
    /// generate a `NodeConfig`.
    pub fn try_parse_from(input: String) -> Result<Self, CoreError> {
        match toml::from_str::<NodeConfig>(&input) {
            Ok(c) => Ok(c),
            Err(e) => Err(CoreError::ConfigError(e.to_string())),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new()
    }
}
