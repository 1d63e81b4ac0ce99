//! Inclusion of finalized root-chain deposits.

use plasma_db_types::{
    traits::{DatabaseBackend, PlasmaDatabase},
    DbError, StateBatch,
};
use plasma_primitives::position::Position;
use plasma_state::{deposit::Deposit, msg::IncludeDeposit, utxo::Utxo};
use tracing::*;

use crate::{
    block::BlockAccumulator,
    context::RootChainView,
    errors::{invariant_violation, read_err, TxError, ViewError},
};

/// Verdict on a deposit inclusion request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositCheck {
    /// The deposit can be credited.
    Include(Deposit),

    /// The deposit was credited before.  Resubmission is a no-op.
    AlreadyIncluded,
}

/// Checks a deposit inclusion request.
pub fn check_deposit(
    msg: &IncludeDeposit,
    plasma_db: &impl PlasmaDatabase,
    view: &impl RootChainView,
    acc: &BlockAccumulator,
) -> Result<DepositCheck, TxError> {
    if plasma_db
        .is_deposit_included(msg.nonce)
        .map_err(read_err)?
    {
        return Ok(DepositCheck::AlreadyIncluded);
    }

    if !acc.has_room() {
        return Err(TxError::BlockFull);
    }

    let deposit = view
        .deposit(msg.nonce)
        .map_err(view_err)?
        .ok_or(TxError::DepositUnknown(msg.nonce))?;

    if !view.is_deposit_final(msg.nonce).map_err(view_err)? {
        return Err(TxError::DepositNotFinal(msg.nonce));
    }

    if deposit.owner != msg.owner {
        return Err(TxError::DepositOwnerMismatch {
            nonce: msg.nonce,
            expected: deposit.owner,
            got: msg.owner,
        });
    }

    Ok(DepositCheck::Include(deposit))
}

fn view_err(err: ViewError) -> TxError {
    match err {
        ViewError::Unreachable | ViewError::Stale { .. } => TxError::RootChainUnreachable,
    }
}

/// Credits a deposit that passed [`check_deposit`] in the same state.
///
/// The output and the inclusion marker are written together, so a failed
/// write leaves the deposit uncredited and open to resubmission.
pub fn apply_deposit(
    deposit: Deposit,
    backend: &impl DatabaseBackend,
    acc: &mut BlockAccumulator,
) -> Result<Utxo, TxError> {
    let position = Position::deposit(deposit.nonce);
    let utxo = Utxo::standalone(deposit.owner, deposit.amount, position);

    let batch = StateBatch::new()
        .insert_utxo(utxo.clone())
        .mark_deposit_included(deposit.nonce);
    match backend.apply_batch(&batch) {
        Ok(()) => {}
        Err(err @ DbError::UtxoExists(_)) => invariant_violation("PositionCollision", err),
        Err(err) => return Err(TxError::Storage(err)),
    }

    acc.record_deposit();
    info!(nonce = deposit.nonce, owner = %deposit.owner, amount = deposit.amount, "included deposit");
    Ok(utxo)
}
