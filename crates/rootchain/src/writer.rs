//! Submits stored plasma block headers to the root contract.

use std::{sync::Arc, time::Duration};

use plasma_chaintsn::HeaderSink;
use plasma_db_types::traits::PlasmaDatabase;
use tokio::{
    select,
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::*;

use crate::{
    client::{HeaderBatch, RootChainClient},
    error::Result,
    retry::{call_with_retry, with_timeout, RetryPolicy},
    status::{apply_status_updates, RootChainStatus, StatusUpdate},
};

/// Hands header flush requests from execution to the writer task.
///
/// Requests never block.  While one is queued further ones are dropped, the
/// queued one already covers their blocks.
#[derive(Clone, Debug)]
pub struct FlushHandle {
    tx: Option<mpsc::Sender<Option<u64>>>,
}

impl FlushHandle {
    pub(crate) fn new(tx: mpsc::Sender<Option<u64>>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A handle for nodes that do not submit headers.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }
}

impl HeaderSink for FlushHandle {
    fn flush_headers(&self, latest: Option<u64>) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(latest) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Closed(_)) => {
                warn!(?latest, "header writer stopped, dropping flush request")
            }
        }
    }
}

pub(crate) struct WriterCtx<C, P> {
    pub(crate) client: Arc<C>,
    pub(crate) plasma_db: Arc<P>,
    pub(crate) policy: RetryPolicy,
    /// Deadline for a `submitBlock` to be mined.
    pub(crate) submit_timeout: Duration,
    pub(crate) commitment_rate: Duration,
    pub(crate) max_headers: usize,
    pub(crate) status_tx: watch::Sender<RootChainStatus>,
}

/// Submits pending headers on every flush request and on a timer, at most
/// once per commitment rate.
pub(crate) async fn writer_task<C, P>(ctx: WriterCtx<C, P>, mut flush_rx: mpsc::Receiver<Option<u64>>)
where
    C: RootChainClient,
    P: PlasmaDatabase,
{
    let mut ticker = interval(ctx.commitment_rate.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_submission: Option<Instant> = None;

    loop {
        select! {
            req = flush_rx.recv() => match req {
                Some(latest) => trace!(?latest, "header flush requested"),
                None => {
                    info!("flush channel closed, header writer exiting");
                    return;
                }
            },
            _ = ticker.tick() => {}
        }

        if last_submission.is_some_and(|at| at.elapsed() < ctx.commitment_rate) {
            trace!("commitment rate not reached, deferring submission");
            continue;
        }

        match submit_pending(&ctx).await {
            Ok(Some(_)) => last_submission = Some(Instant::now()),
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "header submission failed, will retry on next flush");
                apply_status_updates(&[StatusUpdate::RpcError(err.to_string())], &ctx.status_tx);
            }
        }
    }
}

/// Submits every stored block after the contract's last committed one, up to
/// `max_headers` of them.  Returns the batch sent, if any.
pub(crate) async fn submit_pending<C, P>(ctx: &WriterCtx<C, P>) -> Result<Option<HeaderBatch>>
where
    C: RootChainClient,
    P: PlasmaDatabase,
{
    let client = ctx.client.as_ref();
    let last_committed =
        call_with_retry(&ctx.policy, "last_committed_block", || client.last_committed_block())
            .await?;

    let blocks = ctx
        .plasma_db
        .get_blocks_from(last_committed + 1, ctx.max_headers)?;
    let Some(batch) = HeaderBatch::from_blocks(last_committed, &blocks) else {
        let latest = ctx.plasma_db.get_latest_block_num()?;
        if latest.is_some_and(|l| l < last_committed) {
            warn!(?latest, %last_committed, "contract is ahead of the local block store");
        } else {
            debug!(%last_committed, "no plasma blocks to commit");
        }
        return Ok(None);
    };

    info!(
        first = %batch.first_block,
        last = %batch.last_block(),
        count = %batch.len(),
        "committing plasma headers"
    );

    // a submission is not repeated blindly, the next flush rereads the
    // committed height first
    let submit_policy = RetryPolicy {
        timeout: ctx.submit_timeout,
        ..ctx.policy
    };
    let tx = with_timeout(&submit_policy, client.submit_block(batch.clone())).await?;

    info!(last = %batch.last_block(), %tx, "plasma headers committed");
    apply_status_updates(
        &[
            StatusUpdate::Connected(true),
            StatusUpdate::Submitted {
                last_block: batch.last_block(),
                tx,
            },
        ],
        &ctx.status_tx,
    );

    Ok(Some(batch))
}
