//! Error types for HashLedger

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    InvalidBlockLinkage,
    InvalidBlock(String),
    InvalidIndex { expected: u64, found: u64 },
    InvalidDifficulty(usize),
    NonceSpaceExhausted { max_nonce: u64 },
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidBlockLinkage => write!(f, "Invalid block linkage"),
            ChainError::InvalidBlock(msg) => write!(f, "Invalid block: {}", msg),
            ChainError::InvalidIndex { expected, found } => {
                write!(f, "Invalid block index: expected {}, found {}", expected, found)
            }
            ChainError::InvalidDifficulty(d) => write!(
                f,
                "Invalid difficulty {}: at most {} leading zeros can be required",
                d,
                crate::miner::MAX_DIFFICULTY
            ),
            ChainError::NonceSpaceExhausted { max_nonce } => {
                write!(f, "No valid nonce found up to {}", max_nonce)
            }
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

impl From<crate::config::ConfigError> for ChainError {
    fn from(err: crate::config::ConfigError) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
