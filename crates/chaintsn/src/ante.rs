//! Validation of spend transactions against the store and the root-chain
//! snapshot.
//!
//! Checks run in a fixed order and the first failure decides the rejection:
//! structure, input signatures, spent flags, exits, confirmation signatures,
//! value conservation.  Nothing here writes to the store.

use plasma_db_types::traits::{PlasmaDatabase, UtxoDatabase};
use plasma_primitives::{
    buf::{Address, Buf32, Signature},
    crypto::recover_eth_signer,
};
use plasma_state::{tx::Transaction, utxo::Utxo};
use tracing::*;

use crate::{
    block::BlockAccumulator,
    context::RootChainView,
    errors::{invariant_violation, read_err, TxError, ViewError},
};

/// An input that passed every check, with the record it spends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedInput {
    pub index: usize,
    pub utxo: Utxo,

    /// Confirmation signatures carried on the transaction that get stored on
    /// apply.  Empty when the position already has signatures stored.
    pub new_confirm_sigs: Vec<Signature>,
}

/// A transaction ready to be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedSpend {
    pub tx: Transaction,
    pub inputs: Vec<CheckedInput>,
}

/// Runs all checks on `tx`.  `now` is the block time used to judge the
/// freshness of the snapshot.
pub fn check_spend(
    tx: Transaction,
    utxo_db: &impl UtxoDatabase,
    plasma_db: &impl PlasmaDatabase,
    view: &impl RootChainView,
    acc: &BlockAccumulator,
    now: u64,
) -> Result<CheckedSpend, TxError> {
    tx.validate_basic()?;
    if !acc.has_room() {
        return Err(TxError::BlockFull);
    }

    let inputs = check_input_signatures(&tx, utxo_db)?;
    check_unspent(&inputs)?;
    check_exits(&inputs, view, now)?;
    let new_sigs = check_confirm_sigs(&tx, &inputs, plasma_db)?;
    check_conservation(&tx, &inputs, acc)?;

    let inputs = inputs
        .into_iter()
        .zip(new_sigs)
        .map(|((index, utxo), new_confirm_sigs)| CheckedInput {
            index,
            utxo,
            new_confirm_sigs,
        })
        .collect();

    Ok(CheckedSpend { tx, inputs })
}

fn input_confirm_sigs(tx: &Transaction, index: usize) -> &[Signature] {
    tx.inputs()
        .nth(index)
        .map(|(_, input)| input.confirm_sigs.as_slice())
        .unwrap_or_default()
}

/// Resolves every input and checks its signer owns the referenced output.
fn check_input_signatures(
    tx: &Transaction,
    utxo_db: &impl UtxoDatabase,
) -> Result<Vec<(usize, Utxo)>, TxError> {
    let mut resolved = Vec::with_capacity(2);
    for (index, input) in tx.inputs() {
        let position = input.position;
        let utxo = utxo_db
            .get_utxo_by_position(&position)
            .map_err(read_err)?
            .ok_or(TxError::UtxoNotFound(position))?;

        let signer = tx.input_signer(index).ok().flatten();
        if signer != Some(utxo.owner) {
            debug!(%position, ?signer, owner = %utxo.owner, "input signer mismatch");
            return Err(TxError::Unauthorized { index, position });
        }

        resolved.push((index, utxo));
    }
    Ok(resolved)
}

fn check_unspent(inputs: &[(usize, Utxo)]) -> Result<(), TxError> {
    for (_, utxo) in inputs {
        if !utxo.valid {
            return Err(TxError::AlreadySpent(utxo.position));
        }
    }
    Ok(())
}

fn check_exits(
    inputs: &[(usize, Utxo)],
    view: &impl RootChainView,
    now: u64,
) -> Result<(), TxError> {
    for (_, utxo) in inputs {
        let position = utxo.position;
        let state = view.exit_status(&position, now).map_err(|e| match e {
            ViewError::Unreachable => TxError::RootChainUnreachable,
            ViewError::Stale { .. } => TxError::StaleExitStatus(position),
        })?;

        if state.conflicts_with_spend() {
            return Err(TxError::InputExiting { position, state });
        }
    }
    Ok(())
}

/// Every output created by a transaction needs one confirmation signature per
/// input of that transaction.
///
/// Signatures carried on the spend are positional, signature `i` from the
/// owner of input `i`.  Signatures stored earlier through a confirmation
/// message only need to cover every input owner.  Returns, per input, the
/// carried signatures to store on apply.
fn check_confirm_sigs(
    tx: &Transaction,
    inputs: &[(usize, Utxo)],
    plasma_db: &impl PlasmaDatabase,
) -> Result<Vec<Vec<Signature>>, TxError> {
    let mut new_sigs = Vec::with_capacity(inputs.len());
    for (index, utxo) in inputs {
        if !utxo.requires_confirm_sigs() {
            new_sigs.push(Vec::new());
            continue;
        }

        let index = *index;
        let position = utxo.position;
        let conf_hash = confirm_target(utxo);
        let stored = plasma_db.get_confirm_sigs(&position).map_err(read_err)?;
        let carried = input_confirm_sigs(tx, index);

        if carried.is_empty() {
            let covered = utxo
                .input_addresses
                .iter()
                .all(|owner| stored.iter().any(|sig| signed_by(&conf_hash, sig, owner)));
            if !covered {
                return Err(TxError::MissingConfirmSig { index, position });
            }
            new_sigs.push(Vec::new());
            continue;
        }

        if carried.len() < utxo.input_addresses.len() {
            return Err(TxError::MissingConfirmSig { index, position });
        }
        if carried.len() > utxo.input_addresses.len() {
            return Err(TxError::InvalidConfirmSig { index, position });
        }
        for (sig, owner) in carried.iter().zip(&utxo.input_addresses) {
            if !signed_by(&conf_hash, sig, owner) {
                return Err(TxError::InvalidConfirmSig { index, position });
            }
        }

        if stored.is_empty() {
            new_sigs.push(carried.to_vec());
        } else {
            trace!(%position, "confirmation signatures already stored");
            new_sigs.push(Vec::new());
        }
    }
    Ok(new_sigs)
}

/// Confirmation hash of an output created by a transaction.
pub(crate) fn confirm_target(utxo: &Utxo) -> Buf32 {
    let position = utxo.position;
    let Some(conf_hash) = utxo.confirmation_hash else {
        invariant_violation("CorruptStoreEntry", format!("utxo {position} lacks confirmation hash"));
    };
    if utxo.input_addresses.is_empty() {
        invariant_violation("CorruptStoreEntry", format!("utxo {position} lacks input owners"));
    }
    conf_hash
}

pub(crate) fn signed_by(conf_hash: &Buf32, sig: &Signature, owner: &Address) -> bool {
    recover_eth_signer(conf_hash, sig).is_ok_and(|signer| signer == *owner)
}

/// Inputs must equal outputs plus fee.  Totals that do not fit in a `u64`
/// never balance.
fn check_conservation(
    tx: &Transaction,
    inputs: &[(usize, Utxo)],
    acc: &BlockAccumulator,
) -> Result<(), TxError> {
    let input_total = inputs
        .iter()
        .try_fold(0u64, |sum, (_, u)| sum.checked_add(u.amount));
    let output_total = tx.output_total();

    let mismatch = || TxError::ValueMismatch {
        inputs: input_total.unwrap_or(u64::MAX),
        outputs: output_total.unwrap_or(u64::MAX),
    };

    match (input_total, output_total) {
        (Some(i), Some(o)) if i == o => {}
        _ => return Err(mismatch()),
    }

    let available = inputs.first().map_or(0, |(_, u)| u.amount);
    if available < tx.fee {
        return Err(TxError::InsufficientFee {
            available,
            fee: tx.fee,
        });
    }

    if !acc.can_take_fee(tx.fee) {
        return Err(mismatch());
    }

    Ok(())
}
