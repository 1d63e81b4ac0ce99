//! Trait definitions for low level database interfaces.

use std::sync::Arc;

use plasma_primitives::{
    buf::{Address, Buf32, Signature},
    position::Position,
};
use plasma_state::{
    block::PlasmaBlock,
    tx_record::TxRecord,
    utxo::{Utxo, UtxoKey},
};

use crate::{DbResult, StateBatch};

/// Common database backend interface that worker tasks can be parameterized
/// over instead of each individual trait.
pub trait DatabaseBackend: Send + Sync + 'static {
    type UtxoDb: UtxoDatabase;
    type PlasmaDb: PlasmaDatabase;

    fn utxo_db(&self) -> Arc<Self::UtxoDb>;
    fn plasma_db(&self) -> Arc<Self::PlasmaDb>;

    /// Commits every write in `batch` in one transaction.  Nothing is
    /// written if any write fails.
    fn apply_batch(&self, batch: &StateBatch) -> DbResult<()>;
}

/// Keyed store of UTXO records.
///
/// Records are keyed by `owner ‖ position` so that all outputs of an address
/// form one contiguous range.  Records are never removed.
pub trait UtxoDatabase: Send + Sync + 'static {
    /// Gets the record stored under `(owner, position)`.
    fn get_utxo(&self, owner: &Address, position: &Position) -> DbResult<Option<Utxo>>;

    /// Gets the record at `position` regardless of owner.
    fn get_utxo_by_position(&self, position: &Position) -> DbResult<Option<Utxo>>;

    /// Gets the outputs of `owner` in position order.  Spent outputs are only
    /// included when `include_spent` is set.
    fn get_utxos_for_owner(&self, owner: &Address, include_spent: bool) -> DbResult<Vec<Utxo>>;

    /// Inserts a new record.  Fails with [`DbError::UtxoExists`] if the key is
    /// taken.
    ///
    /// [`DbError::UtxoExists`]: crate::DbError::UtxoExists
    fn insert_utxo(&self, utxo: Utxo) -> DbResult<()>;

    /// Marks the record as spent and records the keys of the outputs that
    /// spent it.
    ///
    /// Fails with `UtxoNotFound` if nothing is stored at the key and
    /// `UtxoAlreadySpent` if the record was already spent.
    fn spend_utxo(
        &self,
        owner: &Address,
        position: &Position,
        spender_keys: Vec<UtxoKey>,
    ) -> DbResult<()>;

    /// The store's key scheme.
    fn construct_key(&self, owner: &Address, position: &Position) -> UtxoKey {
        UtxoKey::new(owner, position)
    }
}

/// Plasma chain metadata: committed blocks, confirmation signatures, deposit
/// inclusion markers and applied transaction records.
/// Operations are NOT VALIDATED at this level beyond ordering and caps.
pub trait PlasmaDatabase: Send + Sync + 'static {
    /// Stores a block.  `block_num` must directly follow the latest stored
    /// block, starting at 1.
    fn put_block(&self, block_num: u64, block: PlasmaBlock) -> DbResult<()>;

    fn get_block(&self, block_num: u64) -> DbResult<Option<PlasmaBlock>>;

    /// Up to `limit` stored blocks numbered `start` and above, in order.
    fn get_blocks_from(&self, start: u64, limit: usize) -> DbResult<Vec<(u64, PlasmaBlock)>>;

    /// Number of the most recently stored block, if any.
    fn get_latest_block_num(&self) -> DbResult<Option<u64>>;

    /// Number the next stored block will receive.
    fn next_block_num(&self) -> DbResult<u64> {
        Ok(self.get_latest_block_num()?.map_or(1, |n| n + 1))
    }

    /// Gets the confirmation signatures stored for `position`.
    fn get_confirm_sigs(&self, position: &Position) -> DbResult<Vec<Signature>>;

    /// Appends confirmation signatures for `position`, skipping ones already
    /// stored.  Fails without writing if the result would exceed the cap.
    fn append_confirm_sigs(&self, position: &Position, sigs: &[Signature]) -> DbResult<()>;

    fn mark_deposit_included(&self, nonce: u64) -> DbResult<()>;

    fn is_deposit_included(&self, nonce: u64) -> DbResult<bool>;

    fn put_tx_record(&self, record: TxRecord) -> DbResult<()>;

    fn get_tx_record(&self, merkle_hash: &Buf32) -> DbResult<Option<TxRecord>>;
}
