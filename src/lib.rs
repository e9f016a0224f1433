//! HashLedger - a hash-linked ledger sealed with proof of work
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger and chain validation
//! - [`transaction`] - Transfer values recorded in block payloads
//!
//! ## Proof of Work
//! - [`miner`] - Nonce search (sequential, bounded and parallel)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - Terminal rendering for the demo driver

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Proof of Work
// ============================================================================
pub mod miner;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
