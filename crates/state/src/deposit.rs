//! Root-chain deposits.

use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::buf::Address;
use serde::{Deserialize, Serialize};

/// A deposit made into the root contract.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Deposit {
    pub nonce: u64,
    pub owner: Address,
    pub amount: u64,
    /// Root-chain block the deposit was made in.
    pub eth_block_num: u64,
}

impl Deposit {
    pub fn new(nonce: u64, owner: Address, amount: u64, eth_block_num: u64) -> Self {
        Self {
            nonce,
            owner,
            amount,
            eth_block_num,
        }
    }

    /// Whether the deposit is at least `finality` blocks deep at `tip`.
    pub fn is_final_at(&self, tip: u64, finality: u64) -> bool {
        tip.checked_sub(self.eth_block_num)
            .is_some_and(|depth| depth >= finality)
    }
}
