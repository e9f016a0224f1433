use crate::error::{ChainError, Result};
use tracing::warn;

use super::chain::{Block, Ledger};

/// How thoroughly [`Ledger::validate`] checks the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ValidationMode {
    /// Digest self-consistency and linkage only.
    #[default]
    Lenient,
    /// Lenient checks plus `blocks[i].index == i`.
    Strict,
}

/// Checks `current` against its predecessor: stored digest first, then link.
pub fn validate_link(previous: &Block, current: &Block) -> Result<()> {
    let recomputed = current.compute_digest();
    if current.digest != recomputed {
        return Err(ChainError::InvalidBlock(format!(
            "Digest mismatch at index {}. Stored {}, recomputed {}.",
            current.index, current.digest, recomputed
        )));
    }
    if current.previous_digest != previous.digest {
        return Err(ChainError::InvalidBlockLinkage);
    }
    Ok(())
}

impl Ledger {
    /// Walks the chain from block 1 and stops at the first failure. Genesis
    /// has no predecessor and is only checked for its index in strict mode.
    pub fn validate(&self, mode: ValidationMode) -> Result<()> {
        let blocks = self.blocks();
        let strict = mode == ValidationMode::Strict;

        if strict {
            check_position(&blocks[0], 0)?;
        }
        for (position, pair) in blocks.windows(2).enumerate() {
            validate_link(&pair[0], &pair[1])?;
            if strict {
                check_position(&pair[1], position as u64 + 1)?;
            }
        }
        Ok(())
    }

    /// Validity under the ledger's configured mode.
    pub fn is_valid(&self) -> bool {
        self.is_valid_with(self.validation_mode())
    }

    pub fn is_valid_with(&self, mode: ValidationMode) -> bool {
        match self.validate(mode) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ledger failed {:?} validation: {}", mode, e);
                false
            }
        }
    }
}

fn check_position(block: &Block, expected: u64) -> Result<()> {
    if block.index != expected {
        return Err(ChainError::InvalidIndex {
            expected,
            found: block.index,
        });
    }
    Ok(())
}
