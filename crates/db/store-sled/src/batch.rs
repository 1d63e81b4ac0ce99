//! Atomic application of [`StateBatch`]es across the chain trees.

use plasma_db_types::{DbError, DbResult, StateBatch};
use plasma_primitives::constants::MAX_CONFIRM_SIGS;
use sled::{
    transaction::{ConflictableTransactionError, ConflictableTransactionResult},
    Transactional,
};
use tracing::*;

use crate::{
    plasma::{
        db::PlasmaDBSled,
        schemas::{ConfirmSigSchema, IncludedDepositSchema, PlasmaBlockSchema, TxRecordSchema},
    },
    tree::TxTree,
    utxo::{
        db::UtxoDBSled,
        schemas::{UtxoOwnerByPositionSchema, UtxoSchema},
    },
    SledDbConfig,
};

fn abort<T>(err: DbError) -> ConflictableTransactionResult<T, DbError> {
    Err(ConflictableTransactionError::Abort(err))
}

/// Commits `batch` in one sled transaction spanning every tree it touches.
pub(crate) fn apply_batch(
    utxo_db: &UtxoDBSled,
    plasma_db: &PlasmaDBSled,
    config: &SledDbConfig,
    batch: &StateBatch,
) -> DbResult<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let trees = (
        utxo_db.utxo_tree.raw(),
        utxo_db.owner_tree.raw(),
        plasma_db.confirm_sig_tree.raw(),
        plasma_db.deposit_tree.raw(),
        plasma_db.tx_record_tree.raw(),
        plasma_db.block_tree.raw(),
    );

    config.with_retry(|| {
        trees.transaction(|(ut, ot, ct, dt, rt, bt)| {
            let ut = TxTree::<UtxoSchema>::new(ut);
            let ot = TxTree::<UtxoOwnerByPositionSchema>::new(ot);
            let ct = TxTree::<ConfirmSigSchema>::new(ct);
            let dt = TxTree::<IncludedDepositSchema>::new(dt);
            let rt = TxTree::<TxRecordSchema>::new(rt);
            let bt = TxTree::<PlasmaBlockSchema>::new(bt);

            for spend in &batch.spends {
                let Some(mut utxo) = ut.get(&spend.key)? else {
                    return abort(DbError::UtxoNotFound(spend.key.clone()));
                };
                if !utxo.valid {
                    return abort(DbError::UtxoAlreadySpent(spend.key.clone()));
                }
                utxo.valid = false;
                utxo.spender_keys = spend.spender_keys.clone();
                ut.insert(&spend.key, &utxo)?;
            }

            for utxo in &batch.new_utxos {
                let key = utxo.key();
                if ut.get(&key)?.is_some() || ot.get(&utxo.position)?.is_some() {
                    return abort(DbError::UtxoExists(key));
                }
                ut.insert(&key, utxo)?;
                ot.insert(&utxo.position, &utxo.owner)?;
            }

            for (position, sigs) in &batch.confirm_sigs {
                let mut stored = ct.get(position)?.unwrap_or_default();
                for sig in sigs {
                    if !stored.contains(sig) {
                        stored.push(*sig);
                    }
                }
                if stored.len() > MAX_CONFIRM_SIGS {
                    return abort(DbError::ConfirmSigLimit {
                        position: *position,
                        limit: MAX_CONFIRM_SIGS,
                    });
                }
                ct.insert(position, &stored)?;
            }

            if let Some(record) = &batch.tx_record {
                rt.insert(&record.merkle_hash, record)?;
            }

            if let Some(nonce) = batch.included_deposit {
                dt.insert(&nonce, &())?;
            }

            if let Some((block_num, block)) = &batch.block {
                let block_num = *block_num;
                let follows = match block_num {
                    0 => false,
                    1 => true,
                    n => bt.get(&(n - 1))?.is_some(),
                };
                if !follows || bt.get(&block_num)?.is_some() {
                    return abort(DbError::OooInsert("PlasmaBlockSchema", block_num));
                }
                bt.insert(&block_num, block)?;
            }

            Ok(())
        })
    })?;

    trace!(
        spends = batch.spends.len(),
        outputs = batch.new_utxos.len(),
        block = ?batch.block.as_ref().map(|(n, _)| *n),
        "applied state batch"
    );
    Ok(())
}
