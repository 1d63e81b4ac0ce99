//! Child chain state types: transactions, UTXO records, blocks, and mirrors
//! of root-chain deposits and exits.

pub mod block;
pub mod deposit;
pub mod errors;
pub mod exit;
pub mod msg;
pub mod tx;
pub mod tx_record;
pub mod utxo;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
