use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::miner::{check_difficulty, find_nonce, find_nonce_bounded, find_nonce_parallel};
use crate::transaction::Transaction;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, info};

use super::validation::ValidationMode;

/// Lowercase hex SHA-256 digest.
pub type HexDigest = String;

/// `previous_digest` of the genesis block.
pub const GENESIS_PREVIOUS_DIGEST: &str = "0";
pub const GENESIS_DATA: &str = "Genesis Block";
pub const DEFAULT_DIFFICULTY: usize = 4;
pub const DEFAULT_MINING_REWARD: u64 = 50;

pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Block content. Genesis carries free text, mined blocks carry rendered
/// transactions in queue order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Payload {
    Text(String),
    Entries(Vec<String>),
}

impl Payload {
    /// Rendering fed into the block digest: text verbatim, entries as
    /// `['a', 'b']` with each entry quoted by [`quote_entry`].
    pub fn canonical(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Entries(entries) => {
                let quoted: Vec<String> = entries.iter().map(|e| quote_entry(e)).collect();
                format!("[{}]", quoted.join(", "))
            }
        }
    }

    pub fn entries(&self) -> &[String] {
        match self {
            Payload::Text(_) => &[],
            Payload::Entries(entries) => entries,
        }
    }
}

/// Quotes one payload entry. Single quotes unless the entry contains `'` and
/// no `"`. Backslashes, the chosen quote and control characters are escaped,
/// so distinct entry lists never render to the same string.
pub fn quote_entry(entry: &str) -> String {
    let quote = if entry.contains('\'') && !entry.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(entry.len() + 2);
    out.push(quote);
    for c in entry.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_digest: HexDigest,
    pub timestamp: u64,
    pub payload: Payload,
    pub nonce: u64,
    pub digest: HexDigest,
}

impl Block {
    pub fn new(index: u64, previous_digest: impl Into<String>, timestamp: u64, payload: Payload) -> Self {
        Self::with_nonce(index, previous_digest, timestamp, payload, 0)
    }

    /// Builds the record and computes its digest. Index and linkage are not
    /// checked here; that is the ledger's job.
    pub fn with_nonce(
        index: u64,
        previous_digest: impl Into<String>,
        timestamp: u64,
        payload: Payload,
        nonce: u64,
    ) -> Self {
        let mut block = Block {
            index,
            previous_digest: previous_digest.into(),
            timestamp,
            payload,
            nonce,
            digest: String::new(),
        };
        block.digest = block.compute_digest();
        block
    }

    pub fn compute_digest(&self) -> HexDigest {
        self.digest_with_nonce(self.nonce)
    }

    /// SHA-256 over `index || previous_digest || timestamp || payload || nonce`,
    /// each in its string form, with the other fields held fixed.
    pub fn digest_with_nonce(&self, nonce: u64) -> HexDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.index.to_string());
        hasher.update(&self.previous_digest);
        hasher.update(self.timestamp.to_string());
        hasher.update(self.payload.canonical());
        hasher.update(nonce.to_string());
        hex::encode(hasher.finalize())
    }

    pub fn is_self_consistent(&self) -> bool {
        self.digest == self.compute_digest()
    }

    /// Advances the nonce until the digest starts with `difficulty` zeros.
    /// Fails only for a difficulty above [`crate::miner::MAX_DIFFICULTY`] or
    /// when no nonce up to `u64::MAX` works; the block is untouched then.
    pub fn seal(&mut self, difficulty: usize) -> Result<()> {
        let nonce = find_nonce(self, difficulty)?;
        self.set_nonce(nonce);
        Ok(())
    }

    pub fn seal_parallel(&mut self, difficulty: usize) -> Result<()> {
        let nonce = find_nonce_parallel(self, difficulty)?;
        self.set_nonce(nonce);
        Ok(())
    }

    /// Like [`Block::seal`], but leaves the block untouched and errors if no
    /// nonce up to `max_nonce` works.
    pub fn seal_bounded(&mut self, difficulty: usize, max_nonce: u64) -> Result<()> {
        let nonce = find_nonce_bounded(self, difficulty, max_nonce)?;
        self.set_nonce(nonce);
        Ok(())
    }

    fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.digest = self.compute_digest();
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Block Index: {}", self.index)?;
        writeln!(f, "Previous Hash: {}", self.previous_digest)?;
        writeln!(f, "Hash: {}", self.digest)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Data: {}", self.payload)
    }
}

/// Append-only sequence of sealed blocks starting at a genesis block, plus
/// the queue of transactions waiting for the next mined block.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    mining_reward: u64,
    difficulty: usize,
    validation_mode: ValidationMode,
    parallel_sealing: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Expects a config that already passed [`Config::validate`].
    pub fn with_config(config: &Config) -> Self {
        let genesis = Block::new(
            0,
            GENESIS_PREVIOUS_DIGEST,
            now_millis(),
            Payload::Text(config.ledger.genesis_data.clone()),
        );
        let validation_mode = if config.ledger.strict_validation {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        };

        Ledger {
            blocks: vec![genesis],
            pending: Vec::new(),
            mining_reward: config.ledger.mining_reward,
            difficulty: config.ledger.difficulty,
            validation_mode,
            parallel_sealing: config.miner.parallel,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable view for inspection tooling. Blocks cannot be added or
    /// removed through it, but edits are not resealed.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: genesis is created with the ledger.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn latest(&self) -> &Block {
        self.blocks.last().expect("ledger always holds its genesis block")
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn mining_reward(&self) -> u64 {
        self.mining_reward
    }

    /// Difficulty from the configuration; operations take theirs explicitly.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    pub fn set_validation_mode(&mut self, mode: ValidationMode) {
        self.validation_mode = mode;
    }

    /// Unsealed candidate at the next index, stamped with the current time.
    pub fn next_block(&self, payload: Payload) -> Block {
        Block::new(self.blocks.len() as u64, self.latest().digest.clone(), now_millis(), payload)
    }

    /// Links `candidate` to the tail, seals it and appends it. Any preset
    /// `previous_digest` is overwritten. The index must be the chain length.
    pub fn append(&mut self, candidate: Block, difficulty: usize) -> Result<&Block> {
        check_difficulty(difficulty)?;
        let expected = self.blocks.len() as u64;
        if candidate.index != expected {
            return Err(ChainError::InvalidIndex {
                expected,
                found: candidate.index,
            });
        }
        self.link_and_push(candidate, difficulty)?;
        Ok(self.latest())
    }

    /// Same as [`Ledger::append`] without the index check. A wrong index
    /// slips through lenient validation; strict validation catches it.
    pub fn append_unchecked(&mut self, candidate: Block, difficulty: usize) -> Result<&Block> {
        check_difficulty(difficulty)?;
        self.link_and_push(candidate, difficulty)?;
        Ok(self.latest())
    }

    pub fn queue_transaction(&mut self, tx: Transaction) {
        debug!("Queued transaction {}", tx);
        self.pending.push(tx);
    }

    /// Seals every pending transaction into a new block, then replaces the
    /// queue with a single reward for `miner_id`.
    pub fn mine_pending(&mut self, miner_id: &str, difficulty: usize) -> Result<&Block> {
        check_difficulty(difficulty)?;
        let entries: Vec<String> = self.pending.iter().map(Transaction::render).collect();
        let tx_count = entries.len();
        let block = self.next_block(Payload::Entries(entries));

        self.link_and_push(block, difficulty)?;
        self.pending = vec![Transaction::reward(miner_id, self.mining_reward)];

        info!(
            "Mined block {} with {} transaction(s) for {}",
            self.latest().index,
            tx_count,
            miner_id
        );
        Ok(self.latest())
    }

    fn link_and_push(&mut self, mut candidate: Block, difficulty: usize) -> Result<()> {
        candidate.previous_digest = self.latest().digest.clone();
        if self.parallel_sealing {
            candidate.seal_parallel(difficulty)?;
        } else {
            candidate.seal(difficulty)?;
        }
        debug!(
            "Sealed block {} at difficulty {} with nonce {}",
            candidate.index, difficulty, candidate.nonce
        );
        info!("Appended block {} ({})", candidate.index, candidate.digest);
        self.blocks.push(candidate);
        Ok(())
    }
}
