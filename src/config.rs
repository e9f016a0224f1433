//! Configuration management for HashLedger

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD, GENESIS_DATA};
use crate::error::Result;
use crate::miner::MAX_DIFFICULTY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "hashledger.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
    #[serde(default = "default_genesis_data")]
    pub genesis_data: String,
    #[serde(default)]
    pub strict_validation: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            genesis_data: default_genesis_data(),
            strict_validation: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MinerConfig {
    #[serde(default = "default_miner_id")]
    pub id: String,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            id: default_miner_id(),
            parallel: false,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ledger.difficulty {0} exceeds the maximum of {max}", max = MAX_DIFFICULTY)]
    DifficultyTooHigh(usize),
    #[error("ledger.genesis_data must not be empty")]
    EmptyGenesisData,
    #[error("miner.id must not be empty")]
    EmptyMinerId,
}

impl Config {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.ledger.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::DifficultyTooHigh(self.ledger.difficulty));
        }
        if self.ledger.genesis_data.is_empty() {
            return Err(ConfigError::EmptyGenesisData);
        }
        if self.miner.id.trim().is_empty() {
            return Err(ConfigError::EmptyMinerId);
        }
        Ok(())
    }
}

pub fn parse_config(source: &str) -> Result<Config> {
    let config: Config = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Reads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let source = fs::read_to_string(path)?;
    parse_config(&source)
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_mining_reward() -> u64 {
    DEFAULT_MINING_REWARD
}

fn default_genesis_data() -> String {
    GENESIS_DATA.to_string()
}

fn default_miner_id() -> String {
    "Miner1".to_string()
}
