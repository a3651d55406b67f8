//! Error types for EcoLedger

use std::fmt;

#[derive(Debug, Clone)]
pub enum LedgerError {
    InvalidDifficulty(String),
    MiningExhausted { attempts: u64 },
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LedgerError::InvalidDifficulty(msg) => write!(f, "Invalid difficulty: {}", msg),
            LedgerError::MiningExhausted { attempts } => write!(
                f,
                "Mining exhausted after {} iterations without meeting the difficulty target",
                attempts
            ),
            LedgerError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            LedgerError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::IoError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
