//! Confirmation signatures submitted for an output before it is spent.

use plasma_db_types::{
    traits::{DatabaseBackend, PlasmaDatabase, UtxoDatabase},
    DbError, StateBatch,
};
use plasma_primitives::{buf::Signature, constants::MAX_CONFIRM_SIGS, position::Position};
use plasma_state::msg::ConfirmSigs;
use tracing::*;

use crate::{
    ante::{confirm_target, signed_by},
    errors::{read_err, TxError},
};

/// Verdict on a confirmation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmCheck {
    /// Signatures not stored yet for `position`.
    Store {
        position: Position,
        sigs: Vec<Signature>,
    },

    /// Every signature is already stored.  Resubmission is a no-op.
    AlreadyStored,
}

/// Checks a confirmation message.
///
/// The output must exist unspent and have been created by a transaction.
/// Each signature must be by one of its input owners over its confirmation
/// hash, and the stored set stays within the per-position cap.
pub fn check_confirm_msg(
    msg: &ConfirmSigs,
    utxo_db: &impl UtxoDatabase,
    plasma_db: &impl PlasmaDatabase,
) -> Result<ConfirmCheck, TxError> {
    let position = msg.position();
    if position.is_nil() {
        return Err(TxError::InvalidPosition(format!("nil position {position}")));
    }
    position
        .validate()
        .map_err(|e| TxError::InvalidPosition(e.to_string()))?;
    if msg.sigs.is_empty() {
        return Err(TxError::MissingConfirmSig { index: 0, position });
    }

    let utxo = utxo_db
        .get_utxo_by_position(&position)
        .map_err(read_err)?
        .ok_or(TxError::UtxoNotFound(position))?;
    if !utxo.requires_confirm_sigs() {
        return Err(TxError::ConfirmSigsNotRequired(position));
    }
    if !utxo.valid {
        return Err(TxError::AlreadySpent(position));
    }

    let conf_hash = confirm_target(&utxo);
    for (index, sig) in msg.sigs.iter().enumerate() {
        let by_owner = utxo
            .input_addresses
            .iter()
            .any(|owner| signed_by(&conf_hash, sig, owner));
        if !by_owner {
            return Err(TxError::InvalidConfirmSig { index, position });
        }
    }

    let stored = plasma_db.get_confirm_sigs(&position).map_err(read_err)?;
    let mut fresh: Vec<Signature> = Vec::new();
    for sig in &msg.sigs {
        if !stored.contains(sig) && !fresh.contains(sig) {
            fresh.push(*sig);
        }
    }

    if fresh.is_empty() {
        return Ok(ConfirmCheck::AlreadyStored);
    }
    if stored.len() + fresh.len() > MAX_CONFIRM_SIGS {
        return Err(TxError::ConfirmSigLimit {
            position,
            limit: MAX_CONFIRM_SIGS,
        });
    }

    Ok(ConfirmCheck::Store {
        position,
        sigs: fresh,
    })
}

/// Stores signatures that passed [`check_confirm_msg`] in the same state.
pub fn apply_confirm_sigs(
    position: Position,
    sigs: Vec<Signature>,
    backend: &impl DatabaseBackend,
) -> Result<(), TxError> {
    let count = sigs.len();
    let batch = StateBatch::new().append_confirm_sigs(position, sigs);
    backend.apply_batch(&batch).map_err(|err| match err {
        DbError::ConfirmSigLimit { position, limit } => TxError::ConfirmSigLimit { position, limit },
        other => TxError::Storage(other),
    })?;

    info!(%position, %count, "stored confirmation signatures");
    Ok(())
}
