//! End-to-end scenarios for building, mining and validating a ledger

use hashledger::blockchain::{Ledger, Payload, ValidationMode, GENESIS_PREVIOUS_DIGEST};
use hashledger::config::{load_config, Config};
use hashledger::error::ChainError;
use hashledger::miner::meets_difficulty;
use hashledger::transaction::Transaction;
use std::io::Write;

/// Helper to build a ledger with `count` mined blocks at difficulty 1
fn mined_ledger(count: u64) -> Result<Ledger, Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    for i in 0..count {
        ledger.queue_transaction(Transaction::new("Alice", "Bob", 10 + i));
        ledger.mine_pending("Miner1", 1)?;
    }
    Ok(ledger)
}

#[test]
fn test_reward_batching_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    assert_eq!(ledger.len(), 1);

    ledger.queue_transaction(Transaction::new("Alice", "Bob", 100));
    ledger.mine_pending("Miner1", 1)?;

    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger.blocks()[1].payload,
        Payload::Entries(vec!["Alice -> Bob: 100".to_string()])
    );

    let pending = ledger.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sender, None);
    assert_eq!(pending[0].receiver, "Miner1");
    assert_eq!(pending[0].amount, 50);

    assert!(ledger.is_valid());
    Ok(())
}

#[test]
fn test_genesis_invariants() {
    let ledger = Ledger::new();
    assert_eq!(ledger.blocks().len(), 1);
    assert_eq!(ledger.blocks()[0].index, 0);
    assert_eq!(ledger.blocks()[0].previous_digest, GENESIS_PREVIOUS_DIGEST);
    assert!(ledger.is_valid());
}

#[test]
fn test_chain_linkage_after_appends() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    for i in 0..5 {
        let candidate = ledger.next_block(Payload::Text(format!("entry {}", i)));
        ledger.append(candidate, 2)?;
    }

    let blocks = ledger.blocks();
    assert_eq!(blocks.len(), 6);
    for i in 1..blocks.len() {
        assert_eq!(blocks[i].previous_digest, blocks[i - 1].digest);
        assert_eq!(blocks[i].index, i as u64);
        assert!(meets_difficulty(&blocks[i].digest, 2));
    }
    assert!(ledger.is_valid_with(ValidationMode::Strict));
    Ok(())
}

#[test]
fn test_mixed_append_and_mine_stays_valid() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = mined_ledger(2)?;
    let candidate = ledger.next_block(Payload::Text("audit note".to_string()));
    ledger.append(candidate, 1)?;
    ledger.mine_pending("Miner2", 1)?;

    assert_eq!(ledger.len(), 5);
    assert!(ledger.is_valid());
    assert!(ledger.is_valid_with(ValidationMode::Strict));
    Ok(())
}

#[test]
fn test_payload_tampering_invalidates_chain() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = mined_ledger(3)?;
    assert!(ledger.is_valid());

    ledger.blocks_mut()[1].payload = Payload::Entries(vec!["Alice -> Bob: 1000000".to_string()]);
    assert!(!ledger.is_valid());
    assert!(!ledger.is_valid_with(ValidationMode::Strict));
    Ok(())
}

#[test]
fn test_merged_entries_invalidate_chain() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    ledger.queue_transaction(Transaction::new("a", "b", 1));
    ledger.queue_transaction(Transaction::new("c", "d", 2));
    ledger.mine_pending("Miner1", 1)?;

    let merged = Payload::Entries(vec!["a -> b: 1', 'c -> d: 2".to_string()]);
    assert_ne!(merged.canonical(), ledger.blocks()[1].payload.canonical());

    ledger.blocks_mut()[1].payload = merged;
    assert!(!ledger.is_valid());
    Ok(())
}

#[test]
fn test_apostrophe_in_party_name() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    ledger.queue_transaction(Transaction::new("O'Brien", "Bob", 1));
    ledger.mine_pending("Miner1", 1)?;

    assert_eq!(ledger.blocks()[1].payload.canonical(), "[\"O'Brien -> Bob: 1\"]");
    assert!(ledger.is_valid());
    Ok(())
}

#[test]
fn test_broken_link_invalidates_chain() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = mined_ledger(3)?;

    let block = &mut ledger.blocks_mut()[2];
    block.previous_digest = "deadbeef".to_string();
    block.digest = block.compute_digest();

    assert!(!ledger.is_valid());
    assert_eq!(
        ledger.validate(ValidationMode::Lenient),
        Err(ChainError::InvalidBlockLinkage)
    );
    Ok(())
}

#[test]
fn test_pending_queue_replaced_after_each_mine() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = Ledger::new();
    ledger.queue_transaction(Transaction::new("Alice", "Bob", 100));
    ledger.mine_pending("Miner1", 1)?;
    ledger.queue_transaction(Transaction::new("Bob", "Carol", 30));
    ledger.mine_pending("Miner2", 1)?;

    assert_eq!(
        ledger.blocks()[2].payload.entries(),
        ["None -> Miner1: 50".to_string(), "Bob -> Carol: 30".to_string()]
    );
    assert_eq!(ledger.pending(), [Transaction::reward("Miner2", 50)]);
    Ok(())
}

#[test]
fn test_ledger_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "[ledger]\ndifficulty = 1\nmining_reward = 25\ngenesis_data = \"Bank Genesis\"\nstrict_validation = true"
    )?;

    let config = load_config(file.path())?;
    let mut ledger = Ledger::with_config(&config);
    assert_eq!(ledger.validation_mode(), ValidationMode::Strict);
    assert_eq!(ledger.blocks()[0].payload, Payload::Text("Bank Genesis".to_string()));

    ledger.queue_transaction(Transaction::new("Alice", "Bob", 5));
    ledger.mine_pending(&config.miner.id, config.ledger.difficulty)?;
    assert_eq!(ledger.pending(), [Transaction::reward("Miner1", 25)]);
    assert!(ledger.is_valid());
    Ok(())
}

#[test]
fn test_strict_config_flags_misindexed_block() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::default();
    config.ledger.strict_validation = true;
    let mut ledger = Ledger::with_config(&config);

    let mut candidate = ledger.next_block(Payload::Text("out of place".to_string()));
    candidate.index = 42;
    ledger.append_unchecked(candidate, 1)?;

    assert!(!ledger.is_valid());
    assert!(ledger.is_valid_with(ValidationMode::Lenient));
    Ok(())
}

#[test]
fn test_blocks_serialize_to_json() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = mined_ledger(1)?;
    let json = serde_json::to_value(ledger.blocks())?;
    assert_eq!(json[1]["index"], 1);
    assert_eq!(json[1]["digest"], ledger.blocks()[1].digest.as_str());
    assert_eq!(json[1]["payload"]["Entries"][0], "Alice -> Bob: 10");
    Ok(())
}
