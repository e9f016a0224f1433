// Block and ledger construction live in `chain`; whole-chain checks in `validation`.
pub mod chain;
pub mod validation;

pub use chain::*;
pub use validation::*;
