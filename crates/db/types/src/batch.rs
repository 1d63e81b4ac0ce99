//! Write sets committed as one unit.

use plasma_primitives::{buf::Signature, position::Position};
use plasma_state::{
    block::PlasmaBlock,
    tx_record::TxRecord,
    utxo::{Utxo, UtxoKey},
};

/// An input to mark spent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendWrite {
    pub key: UtxoKey,

    /// Keys of the outputs created by the spending transaction.
    pub spender_keys: Vec<UtxoKey>,
}

/// Every store write produced by applying one chain message or committing
/// one block.
///
/// Backends commit a batch in a single transaction: either all writes land
/// or none do.  Each write fails the whole batch under the same conditions
/// as its single-record counterpart on [`UtxoDatabase`] and
/// [`PlasmaDatabase`].
///
/// [`UtxoDatabase`]: crate::traits::UtxoDatabase
/// [`PlasmaDatabase`]: crate::traits::PlasmaDatabase
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateBatch {
    pub spends: Vec<SpendWrite>,
    pub new_utxos: Vec<Utxo>,

    /// Confirmation signatures appended per position, deduplicated and
    /// capped like `append_confirm_sigs`.
    pub confirm_sigs: Vec<(Position, Vec<Signature>)>,

    pub tx_record: Option<TxRecord>,

    /// Deposit nonce to mark as credited.
    pub included_deposit: Option<u64>,

    /// Block to store, numbered right after the latest stored one.
    pub block: Option<(u64, PlasmaBlock)>,
}

impl StateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spend(mut self, key: UtxoKey, spender_keys: Vec<UtxoKey>) -> Self {
        self.spends.push(SpendWrite { key, spender_keys });
        self
    }

    pub fn insert_utxo(mut self, utxo: Utxo) -> Self {
        self.new_utxos.push(utxo);
        self
    }

    pub fn append_confirm_sigs(mut self, position: Position, sigs: Vec<Signature>) -> Self {
        self.confirm_sigs.push((position, sigs));
        self
    }

    pub fn put_tx_record(mut self, record: TxRecord) -> Self {
        self.tx_record = Some(record);
        self
    }

    pub fn mark_deposit_included(mut self, nonce: u64) -> Self {
        self.included_deposit = Some(nonce);
        self
    }

    pub fn put_block(mut self, block_num: u64, block: PlasmaBlock) -> Self {
        self.block = Some((block_num, block));
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
