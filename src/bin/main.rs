#![forbid(unsafe_code)]
//! HashLedger demo driver: records transfers, mines them and checks the chain.

use clap::{Parser, Subcommand};
use colored::*;
use hashledger::blockchain::{Ledger, Payload, ValidationMode};
use hashledger::cli::{ledger_table, parse_transaction, pending_table, validity_label};
use hashledger::config::{load_config, DEFAULT_CONFIG_PATH};
use hashledger::transaction::Transaction;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashledger")]
#[command(about = "Hash-linked proof-of-work ledger", long_about = None)]
struct Cli {
    /// Log filter, e.g. "info" or "hashledger=debug"
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue transfers, mine them and print the resulting chain
    Demo {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Overrides ledger.difficulty
        #[arg(long)]
        difficulty: Option<usize>,
        /// Overrides miner.id
        #[arg(long)]
        miner: Option<String>,
        /// Transfer as SENDER:RECEIVER:AMOUNT; repeatable
        #[arg(long = "tx", value_parser = parse_transaction)]
        transactions: Vec<Transaction>,
        /// Number of blocks to mine
        #[arg(long, default_value_t = 1)]
        rounds: usize,
        /// Seal blocks on all cores
        #[arg(long)]
        parallel: bool,
        /// Validate block indices as well as digests and links
        #[arg(long)]
        strict: bool,
        /// Rewrite block 1 afterwards and validate again
        #[arg(long)]
        tamper: bool,
        /// Print the chain as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level)?)
        .init();

    match cli.command {
        Commands::Demo {
            config,
            difficulty,
            miner,
            transactions,
            rounds,
            parallel,
            strict,
            tamper,
            json,
        } => {
            let mut config = load_config(&config)?;
            if let Some(difficulty) = difficulty {
                config.ledger.difficulty = difficulty;
            }
            if let Some(miner) = miner {
                config.miner.id = miner;
            }
            config.miner.parallel |= parallel;
            config.ledger.strict_validation |= strict;
            config.validate()?;

            let transactions = if transactions.is_empty() {
                vec![Transaction::new("Alice", "Bob", 100)]
            } else {
                transactions
            };

            let mut ledger = Ledger::with_config(&config);
            for tx in transactions {
                ledger.queue_transaction(tx);
            }

            for _ in 0..rounds {
                let start = Instant::now();
                let block = ledger.mine_pending(&config.miner.id, config.ledger.difficulty)?;
                info!(
                    "Block {} sealed with nonce {} in {:.3}s",
                    block.index,
                    block.nonce,
                    start.elapsed().as_secs_f64()
                );
            }

            print_ledger(&ledger, json)?;

            if tamper && ledger.len() > 1 {
                ledger.blocks_mut()[1].payload =
                    Payload::Entries(vec!["Alice -> Mallory: 1000000".to_string()]);
                println!();
                println!("{}", "Block 1 payload rewritten without resealing.".yellow());
                print_ledger(&ledger, json)?;
            }
        }
    }

    Ok(())
}

fn print_ledger(ledger: &Ledger, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(ledger.blocks())?);
        return Ok(());
    }

    println!(
        "{} {} (lenient: {}, strict: {})",
        "Blockchain valid:".bright_cyan().bold(),
        validity_label(ledger.is_valid()),
        ledger.is_valid_with(ValidationMode::Lenient),
        ledger.is_valid_with(ValidationMode::Strict),
    );
    println!("{}", ledger_table(ledger));
    println!("{}", "Pending transactions:".bright_cyan().bold());
    println!("{}", pending_table(ledger));
    Ok(())
}
