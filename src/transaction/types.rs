/// Transaction types for HashLedger
use std::fmt;

/// A transfer of `amount` from `sender` to `receiver`.
///
/// Reward payouts have no sender. The `Display` rendering is the exact text
/// embedded into a block payload, so it feeds every subsequent digest.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: Option<String>,
    pub receiver: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: Some(sender.into()),
            receiver: receiver.into(),
            amount,
        }
    }

    /// Payout to whoever mined a block.
    pub fn reward(receiver: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: None,
            receiver: receiver.into(),
            amount,
        }
    }

    pub fn is_reward(&self) -> bool {
        self.sender.is_none()
    }

    /// Canonical `"<sender> -> <receiver>: <amount>"` form.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sender = self.sender.as_deref().unwrap_or("None");
        write!(f, "{} -> {}: {}", sender, self.receiver, self.amount)
    }
}
