//! Application of checked spends to the store.

use plasma_db_types::{traits::DatabaseBackend, DbError, StateBatch};
use plasma_primitives::buf::Address;
use plasma_state::{
    tx::confirmation_hash,
    tx_record::TxRecord,
    utxo::{Utxo, UtxoKey},
};
use tracing::*;

use crate::{
    ante::CheckedSpend,
    block::{BlockAccumulator, BlockContext},
    errors::{invariant_violation, TxError},
};

/// Applies a spend that passed [`check_spend`](crate::ante::check_spend) in
/// the same state.
///
/// Inputs are marked spent, outputs are created at the next positions of the
/// block, carried confirmation signatures are stored and the fee is added to
/// the accumulator.  All store writes go out as one batch.
pub fn apply_spend(
    spend: CheckedSpend,
    backend: &impl DatabaseBackend,
    ctx: &BlockContext,
    acc: &mut BlockAccumulator,
) -> Result<TxRecord, TxError> {
    let CheckedSpend { tx, inputs } = spend;
    let merkle_hash = tx.merkle_hash();
    let conf_hash = confirmation_hash(&merkle_hash, &ctx.header);
    let input_addresses: Vec<Address> = inputs.iter().map(|i| i.utxo.owner).collect();

    let outputs: Vec<Utxo> = tx
        .outputs()
        .map(|(i, out)| {
            Utxo::from_tx_output(
                out.owner,
                out.amount,
                acc.next_output_position(i as u8),
                input_addresses.clone(),
                merkle_hash,
                conf_hash,
            )
        })
        .collect();
    let spender_keys: Vec<UtxoKey> = outputs.iter().map(Utxo::key).collect();

    let mut batch = StateBatch::new();
    for input in inputs {
        let position = input.utxo.position;
        batch = batch.spend(input.utxo.key(), spender_keys.clone());
        if !input.new_confirm_sigs.is_empty() {
            batch = batch.append_confirm_sigs(position, input.new_confirm_sigs);
        }
    }
    for utxo in &outputs {
        trace!(position = %utxo.position, "creating output");
        batch = batch.insert_utxo(utxo.clone());
    }

    let record = TxRecord {
        tx,
        block_num: acc.block_num(),
        tx_index: acc.tx_index(),
        merkle_hash,
        confirmation_hash: conf_hash,
    };
    batch = batch.put_tx_record(record.clone());

    match backend.apply_batch(&batch) {
        Ok(()) => {}
        Err(err @ (DbError::UtxoNotFound(_) | DbError::UtxoAlreadySpent(_))) => {
            invariant_violation("CorruptStoreEntry", err)
        }
        Err(err @ DbError::UtxoExists(_)) => invariant_violation("PositionCollision", err),
        Err(DbError::ConfirmSigLimit { position, limit }) => {
            return Err(TxError::ConfirmSigLimit { position, limit })
        }
        Err(err) => return Err(TxError::Storage(err)),
    }

    acc.record_tx(record.tx.fee);
    debug!(
        block_num = record.block_num,
        tx_index = record.tx_index,
        %merkle_hash,
        fee = record.tx.fee,
        "applied spend"
    );
    Ok(record)
}
