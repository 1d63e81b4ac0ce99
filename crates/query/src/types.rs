use plasma_primitives::buf::{Buf32, Signature};
use plasma_state::{block::PlasmaBlock, tx_record::TxRecord, utxo::Utxo};
use serde::{Deserialize, Serialize};

/// A committed plasma block with its number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub number: u64,
    pub header: Buf32,
    pub txn_count: u16,
    pub fee_amount: u64,
    pub created_at: u64,
    pub consensus_height: u64,
}

impl BlockInfo {
    pub fn new(number: u64, block: PlasmaBlock) -> Self {
        Self {
            number,
            header: block.header,
            txn_count: block.txn_count,
            fee_amount: block.fee_amount,
            created_at: block.created_at,
            consensus_height: block.consensus_height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksResponse {
    /// Number the window starts at, even if no block is stored there yet.
    pub starting_block: u64,
    pub blocks: Vec<BlockInfo>,
}

/// An output with everything needed to spend or exit it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub utxo: Utxo,

    /// Transaction that created the output.  `None` for deposit and fee
    /// outputs.
    pub tx: Option<TxRecord>,

    /// Confirmation signatures collected for the creating transaction.
    pub confirm_sigs: Vec<Signature>,

    /// Merkle hash of the transaction that spent the output, if spent.
    pub spent_by: Option<Buf32>,
}
