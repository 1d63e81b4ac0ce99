//! Chain-wide constants.
//!
//! These mirror the values the root contract uses when computing exit
//! priorities, so they must not drift from the deployed contract.

/// Maximum number of inputs in a transaction.
pub const MAX_INPUTS: usize = 2;

/// Maximum number of outputs in a transaction.
pub const MAX_OUTPUTS: usize = 2;

/// Transaction index reserved for the per-block fee UTXO.
pub const FEE_TX_INDEX: u16 = u16::MAX;

/// Output index used by the per-block fee UTXO.
pub const FEE_OUTPUT_INDEX: u8 = 0;

/// Maximum number of confirmation signatures stored for a single position.
pub const MAX_CONFIRM_SIGS: usize = 2;

/// Multiplier applied to the block number when computing exit priority.
pub const BLOCK_INDEX_FACTOR: u64 = 1_000_000;

/// Multiplier applied to the transaction index when computing exit priority.
pub const TX_INDEX_FACTOR: u64 = 10;

/// Denomination of the single asset tracked by the chain.
pub const NATIVE_DENOM: &str = "wei";
