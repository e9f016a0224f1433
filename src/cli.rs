//! Terminal helpers shared by the HashLedger binary

use crate::blockchain::{Block, Ledger};
use crate::transaction::Transaction;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};

/// Parses `SENDER:RECEIVER:AMOUNT`, e.g. `Alice:Bob:100`.
pub fn parse_transaction(input: &str) -> Result<Transaction, String> {
    let parts: Vec<&str> = input.split(':').map(str::trim).collect();
    let [sender, receiver, amount] = parts.as_slice() else {
        return Err(format!("expected SENDER:RECEIVER:AMOUNT, got '{}'", input));
    };
    if sender.is_empty() || receiver.is_empty() {
        return Err(format!("sender and receiver must not be empty in '{}'", input));
    }
    let amount = amount
        .parse::<u64>()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    Ok(Transaction::new(*sender, *receiver, amount))
}

/// Shortens to the first and last ten characters. Counts chars, not bytes,
/// since a hand-edited digest may hold any text.
pub fn format_digest(digest: &str) -> String {
    let chars: Vec<char> = digest.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        digest.to_string()
    }
}

pub fn validity_label(valid: bool) -> ColoredString {
    if valid {
        "VALID".bright_green().bold()
    } else {
        "INVALID".bright_red().bold()
    }
}

fn payload_cell(block: &Block) -> Cell {
    let text = match block.payload.entries() {
        [] => block.payload.to_string(),
        entries => entries.join("\n"),
    };
    Cell::new(text)
}

pub fn ledger_table(ledger: &Ledger) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Index").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Previous Hash").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Hash").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Nonce").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
            Cell::new("Data").add_attribute(Attribute::Bold).fg(TableColor::Cyan),
        ]);

    for block in ledger.blocks() {
        let hash_color = if block.is_self_consistent() {
            TableColor::Green
        } else {
            TableColor::Red
        };
        table.add_row(vec![
            Cell::new(block.index),
            Cell::new(format_digest(&block.previous_digest)),
            Cell::new(format_digest(&block.digest)).fg(hash_color),
            Cell::new(block.nonce),
            payload_cell(block),
        ]);
    }
    table
}

pub fn pending_table(ledger: &Ledger) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Sender", "Receiver", "Amount"]);
    for tx in ledger.pending() {
        table.add_row(vec![
            Cell::new(tx.sender.as_deref().unwrap_or("(reward)")),
            Cell::new(&tx.receiver),
            Cell::new(tx.amount),
        ]);
    }
    table
}
