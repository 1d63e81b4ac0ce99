//! Entry points driven by the consensus layer.

use std::sync::Arc;

use plasma_db_types::{
    traits::{DatabaseBackend, PlasmaDatabase},
    DbResult,
};
use plasma_state::{msg::ChainMsg, tx_record::TxRecord, utxo::Utxo};
use tracing::*;

use crate::{
    ante::check_spend,
    block::{BlockAccumulator, BlockContext},
    commit::{commit_block, CommitOutput},
    confirm::{apply_confirm_sigs, check_confirm_msg, ConfirmCheck},
    context::{HeaderSink, RootChainView},
    deposit::{apply_deposit, check_deposit, DepositCheck},
    errors::TxError,
    spend::apply_spend,
};

/// Result of checking a message without applying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    Spend,
    Deposit,
    DepositAlreadyIncluded,
    ConfirmSigs,
    ConfirmSigsAlreadyStored,
}

/// Result of applying a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliverOutcome {
    Spent(TxRecord),
    DepositIncluded(Utxo),
    DepositAlreadyIncluded,
    ConfirmSigsStored,
    ConfirmSigsAlreadyStored,
}

/// Sequential executor of chain messages.
///
/// Messages are checked and applied one at a time in block order.  All
/// per-block counters live in the [`BlockAccumulator`], which is reset when
/// a block is committed.  Each applied message reaches the store as a single
/// batch, so a failed write leaves neither the store nor the accumulator
/// half-updated.
#[derive(Debug)]
pub struct ChainExecutor<B, H> {
    backend: Arc<B>,
    header_sink: H,
    acc: BlockAccumulator,
    current: Option<BlockContext>,
}

impl<B, H> ChainExecutor<B, H>
where
    B: DatabaseBackend,
    H: HeaderSink,
{
    /// Creates an executor continuing from the blocks already stored.
    pub fn new(backend: Arc<B>, header_sink: H) -> DbResult<Self> {
        let acc = BlockAccumulator::new(backend.plasma_db().next_block_num()?);
        Ok(Self {
            backend,
            header_sink,
            acc,
            current: None,
        })
    }

    pub fn accumulator(&self) -> &BlockAccumulator {
        &self.acc
    }

    pub fn current_block(&self) -> Option<&BlockContext> {
        self.current.as_ref()
    }

    pub fn begin_block(&mut self, ctx: BlockContext) {
        if let Some(prev) = self.current.replace(ctx) {
            warn!(prev = prev.height, next = ctx.height, "block began before the previous one ended");
        }
        debug!(height = ctx.height, block_num = self.acc.block_num(), "begin block");
    }

    /// Checks a raw message against the current state without applying it.
    /// `now` is the time used to judge snapshot freshness.
    pub fn check_tx(
        &self,
        raw: &[u8],
        view: &impl RootChainView,
        now: u64,
    ) -> Result<CheckOutcome, TxError> {
        let utxo_db = self.backend.utxo_db();
        let plasma_db = self.backend.plasma_db();

        let res = match ChainMsg::decode_bytes(raw)? {
            ChainMsg::Spend(tx) => {
                check_spend(
                    tx,
                    utxo_db.as_ref(),
                    plasma_db.as_ref(),
                    view,
                    &self.acc,
                    now,
                )?;
                CheckOutcome::Spend
            }
            ChainMsg::IncludeDeposit(msg) => {
                match check_deposit(&msg, plasma_db.as_ref(), view, &self.acc)? {
                    DepositCheck::Include(_) => CheckOutcome::Deposit,
                    DepositCheck::AlreadyIncluded => CheckOutcome::DepositAlreadyIncluded,
                }
            }
            ChainMsg::ConfirmSigs(msg) => {
                match check_confirm_msg(&msg, utxo_db.as_ref(), plasma_db.as_ref())? {
                    ConfirmCheck::Store { .. } => CheckOutcome::ConfirmSigs,
                    ConfirmCheck::AlreadyStored => CheckOutcome::ConfirmSigsAlreadyStored,
                }
            }
        };
        Ok(res)
    }

    /// Checks and applies a raw message in the current block.
    pub fn deliver_tx(
        &mut self,
        raw: &[u8],
        view: &impl RootChainView,
    ) -> Result<DeliverOutcome, TxError> {
        let ctx = self.current.ok_or(TxError::NoActiveBlock)?;
        let res = self.deliver_msg(ChainMsg::decode_bytes(raw)?, &ctx, view);
        if let Err(err) = &res {
            debug!(code = err.code(), %err, height = ctx.height, "rejected message");
            if err.is_root_chain() {
                warn!(%err, "rejected message on stale root chain state");
            }
        }
        res
    }

    fn deliver_msg(
        &mut self,
        msg: ChainMsg,
        ctx: &BlockContext,
        view: &impl RootChainView,
    ) -> Result<DeliverOutcome, TxError> {
        let backend = self.backend.as_ref();
        let utxo_db = backend.utxo_db();
        let plasma_db = backend.plasma_db();

        match msg {
            ChainMsg::Spend(tx) => {
                let checked = check_spend(
                    tx,
                    utxo_db.as_ref(),
                    plasma_db.as_ref(),
                    view,
                    &self.acc,
                    ctx.timestamp,
                )?;
                let record = apply_spend(checked, backend, ctx, &mut self.acc)?;
                Ok(DeliverOutcome::Spent(record))
            }
            ChainMsg::IncludeDeposit(msg) => {
                match check_deposit(&msg, plasma_db.as_ref(), view, &self.acc)? {
                    DepositCheck::Include(deposit) => {
                        let utxo = apply_deposit(deposit, backend, &mut self.acc)?;
                        Ok(DeliverOutcome::DepositIncluded(utxo))
                    }
                    DepositCheck::AlreadyIncluded => {
                        debug!(nonce = msg.nonce, "deposit already included");
                        Ok(DeliverOutcome::DepositAlreadyIncluded)
                    }
                }
            }
            ChainMsg::ConfirmSigs(msg) => {
                match check_confirm_msg(&msg, utxo_db.as_ref(), plasma_db.as_ref())? {
                    ConfirmCheck::Store { position, sigs } => {
                        apply_confirm_sigs(position, sigs, backend)?;
                        Ok(DeliverOutcome::ConfirmSigsStored)
                    }
                    ConfirmCheck::AlreadyStored => {
                        debug!(position = %msg.position(), "confirmation signatures already stored");
                        Ok(DeliverOutcome::ConfirmSigsAlreadyStored)
                    }
                }
            }
        }
    }

    /// Commits the current block and asks the synchronizer to flush headers.
    ///
    /// The flush request goes out on every height, including empty ones.
    pub fn end_block(&mut self, view: &impl RootChainView) -> Result<CommitOutput, TxError> {
        let ctx = self.current.take().ok_or(TxError::NoActiveBlock)?;
        let out = commit_block(
            self.acc,
            &ctx,
            view.operator_address(),
            self.backend.as_ref(),
        )
        .map_err(TxError::Storage)?;
        self.acc = out.next;

        let latest = self.acc.block_num().checked_sub(1).filter(|n| *n > 0);
        self.header_sink.flush_headers(latest);
        Ok(out)
    }
}
