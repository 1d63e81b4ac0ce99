use plasma_db_types::{traits::PlasmaDatabase, DbError, DbResult};
use plasma_primitives::{
    buf::{Buf32, Signature},
    constants::MAX_CONFIRM_SIGS,
    position::Position,
};
use plasma_state::{block::PlasmaBlock, tx_record::TxRecord};
use sled::transaction::ConflictableTransactionError;

use super::schemas::{ConfirmSigSchema, IncludedDepositSchema, PlasmaBlockSchema, TxRecordSchema};
use crate::define_sled_database;

define_sled_database!(
    pub struct PlasmaDBSled {
        pub(crate) block_tree: PlasmaBlockSchema,
        pub(crate) confirm_sig_tree: ConfirmSigSchema,
        pub(crate) deposit_tree: IncludedDepositSchema,
        pub(crate) tx_record_tree: TxRecordSchema,
    }
);

impl PlasmaDatabase for PlasmaDBSled {
    fn put_block(&self, block_num: u64, block: PlasmaBlock) -> DbResult<()> {
        let expected = self.next_block_num()?;
        if block_num != expected {
            return Err(DbError::OooInsert("PlasmaBlockSchema", block_num));
        }
        self.block_tree.insert(&block_num, &block)
    }

    fn get_block(&self, block_num: u64) -> DbResult<Option<PlasmaBlock>> {
        self.block_tree.get(&block_num)
    }

    fn get_blocks_from(&self, start: u64, limit: usize) -> DbResult<Vec<(u64, PlasmaBlock)>> {
        self.block_tree.range_from(&start, limit)
    }

    fn get_latest_block_num(&self) -> DbResult<Option<u64>> {
        Ok(self.block_tree.last()?.map(|(num, _)| num))
    }

    fn get_confirm_sigs(&self, position: &Position) -> DbResult<Vec<Signature>> {
        Ok(self.confirm_sig_tree.get(position)?.unwrap_or_default())
    }

    fn append_confirm_sigs(&self, position: &Position, sigs: &[Signature]) -> DbResult<()> {
        self.config.with_retry(|| {
            self.confirm_sig_tree.transaction(|ct| {
                let mut stored = ct.get(position)?.unwrap_or_default();
                for sig in sigs {
                    if !stored.contains(sig) {
                        stored.push(*sig);
                    }
                }

                if stored.len() > MAX_CONFIRM_SIGS {
                    return Err(ConflictableTransactionError::Abort(DbError::ConfirmSigLimit {
                        position: *position,
                        limit: MAX_CONFIRM_SIGS,
                    }));
                }

                ct.insert(position, &stored)?;
                Ok(())
            })
        })
    }

    fn mark_deposit_included(&self, nonce: u64) -> DbResult<()> {
        self.deposit_tree.insert(&nonce, &())
    }

    fn is_deposit_included(&self, nonce: u64) -> DbResult<bool> {
        self.deposit_tree.contains_key(&nonce)
    }

    fn put_tx_record(&self, record: TxRecord) -> DbResult<()> {
        self.tx_record_tree.insert(&record.merkle_hash, &record)
    }

    fn get_tx_record(&self, merkle_hash: &Buf32) -> DbResult<Option<TxRecord>> {
        self.tx_record_tree.get(merkle_hash)
    }
}
