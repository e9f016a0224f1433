//! Proof-of-work nonce search
//!
//! A digest meets difficulty `d` when its first `d` hex characters are `'0'`.
//! Every search here is a pure function of the block's fields: the block is
//! never mutated, and the winning nonce is the lowest one at or above the
//! block's current nonce.

use crate::blockchain::Block;
use crate::error::{ChainError, Result};
use rayon::prelude::*;

/// Length of a SHA-256 digest in hex characters.
pub const MAX_DIFFICULTY: usize = 64;

/// Nonces examined per round by [`find_nonce_parallel`].
pub const PARALLEL_BATCH_SIZE: u64 = 1 << 14;

pub fn meets_difficulty(digest: &str, difficulty: usize) -> bool {
    digest.len() >= difficulty && digest.bytes().take(difficulty).all(|b| b == b'0')
}

pub fn check_difficulty(difficulty: usize) -> Result<()> {
    if difficulty > MAX_DIFFICULTY {
        return Err(ChainError::InvalidDifficulty(difficulty));
    }
    Ok(())
}

/// Sequential search over every nonce from the block's current one up to
/// `u64::MAX`.
pub fn find_nonce(block: &Block, difficulty: usize) -> Result<u64> {
    find_nonce_bounded(block, difficulty, u64::MAX)
}

/// Sequential search that gives up once `max_nonce` has been tried. The
/// starting nonce is always tried, even when it is above `max_nonce`.
pub fn find_nonce_bounded(block: &Block, difficulty: usize, max_nonce: u64) -> Result<u64> {
    check_difficulty(difficulty)?;
    let mut nonce = block.nonce;
    loop {
        if meets_difficulty(&block.digest_with_nonce(nonce), difficulty) {
            return Ok(nonce);
        }
        if nonce >= max_nonce {
            return Err(ChainError::NonceSpaceExhausted { max_nonce });
        }
        nonce += 1;
    }
}

/// Searches batches of nonces across the rayon pool. Within a batch the lowest
/// satisfying nonce wins, so the answer matches [`find_nonce`].
pub fn find_nonce_parallel(block: &Block, difficulty: usize) -> Result<u64> {
    check_difficulty(difficulty)?;
    let mut start = block.nonce;
    loop {
        let end = start.saturating_add(PARALLEL_BATCH_SIZE - 1);
        let found = (start..=end)
            .into_par_iter()
            .find_first(|&nonce| meets_difficulty(&block.digest_with_nonce(nonce), difficulty));
        if let Some(nonce) = found {
            return Ok(nonce);
        }
        if end == u64::MAX {
            return Err(ChainError::NonceSpaceExhausted { max_nonce: u64::MAX });
        }
        start = end + 1;
    }
}
