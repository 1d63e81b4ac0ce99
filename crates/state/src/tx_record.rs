use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::buf::Buf32;
use serde::{Deserialize, Serialize};

use crate::tx::Transaction;

/// An applied transaction with the coordinates it was included at.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TxRecord {
    pub tx: Transaction,
    pub block_num: u64,
    pub tx_index: u16,
    pub merkle_hash: Buf32,
    pub confirmation_hash: Buf32,
}
