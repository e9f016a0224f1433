//! Transaction value type embedded into block payloads

pub mod types;

pub use types::*;
