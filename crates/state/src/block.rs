//! Plasma block metadata committed to the root chain.

use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::buf::Buf32;
use serde::{Deserialize, Serialize};

/// Metadata of a committed plasma block.
///
/// One exists for every consensus height that processed at least one
/// transaction or deposit.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PlasmaBlock {
    /// Commitment over the height's transactions, as computed by consensus.
    pub header: Buf32,
    pub txn_count: u16,
    pub fee_amount: u64,
    /// UNIX seconds of the consensus block.
    pub created_at: u64,
    pub consensus_height: u64,
}

impl PlasmaBlock {
    pub fn new(
        header: Buf32,
        txn_count: u16,
        fee_amount: u64,
        created_at: u64,
        consensus_height: u64,
    ) -> Self {
        Self {
            header,
            txn_count,
            fee_amount,
            created_at,
            consensus_height,
        }
    }
}
