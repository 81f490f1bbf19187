use alloy::primitives::Address;
use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::ledger::models::ChainId;

pub const BASE_MAINNET: ChainId = 8453;
pub const BASE_SEPOLIA: ChainId = 84532;

/// One EVM network the engine operates on
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: ChainId,
    pub name: String,
    pub rpc_url: String,
}

/// Batch timing and eligibility knobs
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Scheduler tick interval
    pub scan_interval_secs: u64,
    /// Pause after each successful lock transaction
    pub lock_delay_ms: u64,
    /// Tournament round from which ACTIVE contests are locked
    pub lock_round: i32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 300,
            lock_delay_ms: 2_000,
            lock_round: 3,
        }
    }
}

impl BatchConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn lock_delay(&self) -> Duration {
        Duration::from_millis(self.lock_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    /// Oracle signing key; absent means every write is refused
    pub oracle_private_key: Option<String>,
    /// Oracle address the contracts are expected to record
    pub oracle_address: Option<String>,
    pub networks: Vec<NetworkConfig>,
    pub batch: BatchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chain_ids = match var("SUPPORTED_CHAIN_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<ChainId>().map_err(|_| {
                        ConfigError::Message(format!("Invalid chain id in SUPPORTED_CHAIN_IDS: {}", s))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![BASE_MAINNET, BASE_SEPOLIA],
        };

        if chain_ids.is_empty() {
            return Err(ConfigError::Message(
                "SUPPORTED_CHAIN_IDS must name at least one chain".to_string(),
            ));
        }

        let networks = chain_ids
            .into_iter()
            .map(|chain_id| Self::network(chain_id, &var))
            .collect::<Result<Vec<_>, _>>()?;

        let defaults = BatchConfig::default();
        let batch = BatchConfig {
            scan_interval_secs: Self::parse_or(&var, "CONTEST_SCAN_INTERVAL_SECS", defaults.scan_interval_secs)?,
            lock_delay_ms: Self::parse_or(&var, "LOCK_TX_DELAY_MS", defaults.lock_delay_ms)?,
            lock_round: Self::parse_or(&var, "LOCK_ROUND_THRESHOLD", defaults.lock_round)?,
        };

        Ok(Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgresql://localhost/contests".to_string()),
            oracle_private_key: var("ORACLE_PRIVATE_KEY").filter(|k| !k.trim().is_empty()),
            oracle_address: var("ORACLE_ADDRESS").filter(|a| !a.trim().is_empty()),
            networks,
            batch,
        })
    }

    fn network(chain_id: ChainId, var: &impl Fn(&str) -> Option<String>) -> Result<NetworkConfig, ConfigError> {
        let (name, well_known) = match chain_id {
            BASE_MAINNET => ("base", var("BASE_RPC_URL")),
            BASE_SEPOLIA => ("base-sepolia", var("BASE_SEPOLIA_RPC_URL")),
            _ => ("evm", None),
        };

        let rpc_url = var(&format!("RPC_URL_{}", chain_id))
            .or(well_known)
            .ok_or_else(|| ConfigError::Message(format!("No RPC URL configured for chain {}", chain_id)))?;

        Ok(NetworkConfig {
            chain_id,
            name: name.to_string(),
            rpc_url,
        })
    }

    fn parse_or<T: FromStr>(
        var: &impl Fn(&str) -> Option<String>,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match var(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Message(format!("Invalid value for {}: {}", key, raw))),
            None => Ok(default),
        }
    }

    pub fn supported_chain_ids(&self) -> Vec<ChainId> {
        self.networks.iter().map(|n| n.chain_id).collect()
    }

    /// Expected oracle per network. Empty when ORACLE_ADDRESS is unset, which
    /// surfaces as a configuration error on the first batch.
    pub fn expected_oracles(&self) -> Result<HashMap<ChainId, Address>, ConfigError> {
        let Some(raw) = &self.oracle_address else {
            return Ok(HashMap::new());
        };

        let address = Address::from_str(raw.trim())
            .map_err(|e| ConfigError::Message(format!("Invalid ORACLE_ADDRESS {}: {}", raw, e)))?;

        Ok(self.networks.iter().map(|n| (n.chain_id, address)).collect())
    }
}
