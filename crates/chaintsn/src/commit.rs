//! End-of-height block commitment.

use plasma_db_types::{traits::DatabaseBackend, DbError, StateBatch};
use plasma_primitives::{buf::Address, position::Position};
use plasma_state::{block::PlasmaBlock, utxo::Utxo};
use tracing::*;

use crate::{
    block::{BlockAccumulator, BlockContext},
    errors::invariant_violation,
};

/// What block commitment produced for a height.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutput {
    /// Number and contents of the stored block, if the height applied
    /// anything.
    pub block: Option<(u64, PlasmaBlock)>,

    /// Fee output minted to the operator, if fees were collected.
    pub fee_utxo: Option<Utxo>,

    /// Accumulator for the next height.
    pub next: BlockAccumulator,
}

/// Commits the block accumulated during the height described by `ctx`.
///
/// Heights that applied nothing store nothing and keep the block number.
/// The block and its fee output are written together.
pub fn commit_block(
    acc: BlockAccumulator,
    ctx: &BlockContext,
    operator: Address,
    backend: &impl DatabaseBackend,
) -> Result<CommitOutput, DbError> {
    if acc.is_empty() {
        trace!(height = ctx.height, "empty height, nothing to commit");
        return Ok(CommitOutput {
            block: None,
            fee_utxo: None,
            next: acc,
        });
    }

    let block_num = acc.block_num();
    let block = PlasmaBlock::new(
        ctx.header,
        acc.tx_index(),
        acc.fee_total(),
        ctx.timestamp,
        ctx.height,
    );

    let fee_utxo = (acc.fee_total() > 0)
        .then(|| Utxo::standalone(operator, acc.fee_total(), Position::fee(block_num)));

    let mut batch = StateBatch::new().put_block(block_num, block.clone());
    if let Some(utxo) = &fee_utxo {
        batch = batch.insert_utxo(utxo.clone());
    }
    match backend.apply_batch(&batch) {
        Ok(()) => {}
        Err(err @ DbError::OooInsert(..)) => invariant_violation("CorruptStoreEntry", err),
        Err(err @ DbError::UtxoExists(_)) => invariant_violation("PositionCollision", err),
        Err(err) => return Err(err),
    }

    info!(
        %block_num,
        height = ctx.height,
        header = %ctx.header,
        txn_count = acc.tx_index(),
        fee = acc.fee_total(),
        "committed plasma block"
    );

    Ok(CommitOutput {
        block: Some((block_num, block)),
        fee_utxo,
        next: acc.next(),
    })
}
