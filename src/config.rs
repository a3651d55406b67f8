//! Configuration management for EcoLedger

use serde::Deserialize;
use std::fs;

use crate::ledger::{DEFAULT_DIFFICULTY, DEFAULT_MAX_MINING_ITERATIONS};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_max_mining_iterations")]
    pub max_mining_iterations: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_mining_iterations: DEFAULT_MAX_MINING_ITERATIONS,
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_max_mining_iterations() -> u64 {
    DEFAULT_MAX_MINING_ITERATIONS
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string("config.toml").unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        // Provide sane defaults when config.toml is absent
        Config {
            server: ServerConfig {
                api_port: default_api_port(),
                bind_address: default_bind_address(),
            },
            ledger: LedgerConfig::default(),
        }
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.ledger.difficulty == 0 || config.ledger.difficulty > 64 {
        return Err("ledger.difficulty must be between 1 and 64 in config.toml".into());
    }

    if config.ledger.max_mining_iterations == 0 {
        return Err("ledger.max_mining_iterations must be positive in config.toml".into());
    }

    if config.server.bind_address.is_empty() {
        return Err("server.bind_address must be set in config.toml".into());
    }

    Ok(config)
}
