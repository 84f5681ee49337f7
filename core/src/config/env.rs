//! # Environment Variable Support For [`NodeConfig`] And [`ConsensusParams`]

use super::NodeConfig;
use crate::errors::CoreError;
use consensus_lib::params::{ConsensusParams, Network};
use std::fmt::Display;
use std::str::FromStr;

pub fn read_string_from_env(env_var: &'static str) -> Result<String, CoreError> {
    std::env::var(env_var).map_err(|e| CoreError::EnvVarNotSet(env_var.to_string(), e))
}

pub fn read_string_from_env_then_parse<T: FromStr>(env_var: &'static str) -> Result<T, CoreError>
where
    <T as FromStr>::Err: Display,
{
    read_string_from_env(env_var)?
        .parse::<T>()
        .map_err(|e| CoreError::EnvVarMalformed(env_var.to_string(), e.to_string()))
}

/// Like [`read_string_from_env_then_parse`], but an unset variable yields
/// `None`.
fn read_optional_from_env_then_parse<T: FromStr>(
    env_var: &'static str,
) -> Result<Option<T>, CoreError>
where
    <T as FromStr>::Err: Display,
{
    match std::env::var(env_var) {
        Ok(_) => read_string_from_env_then_parse(env_var).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(CoreError::EnvVarNotSet(env_var.to_string(), e)),
    }
}

/// Builds a parameter set from environment variables. The epoch schedule is
/// taken from the preset of the network named in `NETWORK`. The result is
/// not validated.
pub fn consensus_params_from_env() -> Result<ConsensusParams, CoreError> {
    let network: Network = read_string_from_env_then_parse("NETWORK")?;

    Ok(ConsensusParams {
        network,
        pow_limit: read_string_from_env_then_parse("POW_LIMIT")?,
        pow_target_timespan: read_string_from_env_then_parse("POW_TARGET_TIMESPAN")?,
        pow_target_spacing: read_string_from_env_then_parse("POW_TARGET_SPACING")?,
        allow_min_difficulty_blocks: read_string_from_env_then_parse(
            "POW_ALLOW_MIN_DIFFICULTY_BLOCKS",
        )?,
        no_retargeting: read_string_from_env_then_parse("POW_NO_RETARGETING")?,
        epochs: ConsensusParams::for_network(network).epochs,
        signer_key: read_string_from_env_then_parse("NETWORK_SIGNER_KEY")?,
        coinbase_signature_height: read_optional_from_env_then_parse(
            "COINBASE_SIGNATURE_HEIGHT",
        )?
        .unwrap_or_default(),
    })
}

impl NodeConfig {
    /// Reads the node configuration from `PARAMSET` and the optional
    /// `LOG_LEVEL`.
    pub fn from_env() -> Result<Self, CoreError> {
        let config = NodeConfig {
            paramset: read_string_from_env_then_parse("PARAMSET")?,
            log_level: read_optional_from_env_then_parse("LOG_LEVEL")?,
        };
        tracing::debug!("NodeConfig from env: {:?}", config);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::protocol::ConsensusParamsetName;

    const PARAMS_VARS: [&str; 8] = [
        "NETWORK",
        "POW_LIMIT",
        "POW_TARGET_TIMESPAN",
        "POW_TARGET_SPACING",
        "POW_ALLOW_MIN_DIFFICULTY_BLOCKS",
        "POW_NO_RETARGETING",
        "NETWORK_SIGNER_KEY",
        "COINBASE_SIGNATURE_HEIGHT",
    ];

    fn set_params_env(params: &ConsensusParams) {
        std::env::set_var("NETWORK", params.network.to_string());
        std::env::set_var("POW_LIMIT", params.pow_limit.to_string());
        std::env::set_var("POW_TARGET_TIMESPAN", params.pow_target_timespan.to_string());
        std::env::set_var("POW_TARGET_SPACING", params.pow_target_spacing.to_string());
        std::env::set_var(
            "POW_ALLOW_MIN_DIFFICULTY_BLOCKS",
            params.allow_min_difficulty_blocks.to_string(),
        );
        std::env::set_var("POW_NO_RETARGETING", params.no_retargeting.to_string());
        std::env::set_var("NETWORK_SIGNER_KEY", params.signer_key.to_string());
        std::env::set_var(
            "COINBASE_SIGNATURE_HEIGHT",
            params.coinbase_signature_height.to_string(),
        );
    }

    fn clear_params_env() {
        for var in PARAMS_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_consensus_params_from_env() {
        let expected = ConsensusParams {
            pow_target_timespan: 600,
            pow_target_spacing: 60,
            coinbase_signature_height: 10,
            ..ConsensusParams::testnet()
        };
        set_params_env(&expected);

        let params = consensus_params_from_env().unwrap();
        assert_eq!(params, expected);
        assert_eq!(ConsensusParamsetName::Env.load().unwrap(), expected);

        clear_params_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_signature_height_defaults_to_zero() {
        set_params_env(&ConsensusParams::mainnet());
        std::env::remove_var("COINBASE_SIGNATURE_HEIGHT");

        let params = consensus_params_from_env().unwrap();
        assert_eq!(params.coinbase_signature_height, 0);
        assert_eq!(params, ConsensusParams::mainnet());

        clear_params_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_and_malformed_variables() {
        set_params_env(&ConsensusParams::regtest());

        std::env::remove_var("POW_LIMIT");
        assert!(matches!(
            consensus_params_from_env(),
            Err(CoreError::EnvVarNotSet(var, _)) if var == "POW_LIMIT"
        ));

        set_params_env(&ConsensusParams::regtest());
        std::env::set_var("POW_TARGET_SPACING", "two minutes");
        assert!(matches!(
            consensus_params_from_env(),
            Err(CoreError::EnvVarMalformed(var, _)) if var == "POW_TARGET_SPACING"
        ));

        set_params_env(&ConsensusParams::regtest());
        std::env::set_var("NETWORK_SIGNER_KEY", "00");
        assert!(matches!(
            consensus_params_from_env(),
            Err(CoreError::EnvVarMalformed(var, _)) if var == "NETWORK_SIGNER_KEY"
        ));

        clear_params_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_env_paramset_is_validated() {
        set_params_env(&ConsensusParams::regtest());
        std::env::set_var("POW_TARGET_SPACING", "0");

        assert!(matches!(
            ConsensusParamsetName::Env.load(),
            Err(CoreError::InvalidParams(_))
        ));

        clear_params_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_node_config_from_env() {
        std::env::set_var("PARAMSET", "testnet");
        std::env::set_var("LOG_LEVEL", "debug");
        let config = NodeConfig::from_env().unwrap();
        assert_eq!(config.paramset, ConsensusParamsetName::Testnet);
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        std::env::remove_var("LOG_LEVEL");
        let config = NodeConfig::from_env().unwrap();
        assert_eq!(config.log_level, None);

        std::env::set_var("PARAMSET", "signet");
        assert!(matches!(
            NodeConfig::from_env(),
            Err(CoreError::EnvVarMalformed(_, _))
        ));

        std::env::remove_var("PARAMSET");
    }
}
