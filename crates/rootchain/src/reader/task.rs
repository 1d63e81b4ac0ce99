use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use plasma_db_types::traits::UtxoDatabase;
use plasma_primitives::{buf::Buf32, position::Position};
use plasma_state::{
    deposit::Deposit,
    exit::{ExitRecord, ExitState},
};
use tokio::{sync::watch, time::sleep};
use tracing::*;

use super::state::{ReaderState, ScannedRange};
use crate::{
    client::{EventKind, RootChainClient},
    error::{Result, SyncError},
    retry::{call_with_retry, RetryPolicy},
    snapshot::RootChainSnapshot,
    status::{apply_status_updates, RootChainStatus, StatusUpdate},
};

pub(crate) struct ReaderCtx<C, U> {
    pub(crate) client: Arc<C>,
    pub(crate) utxo_db: Arc<U>,
    pub(crate) policy: RetryPolicy,
    pub(crate) finality: u64,
    pub(crate) max_log_range: u64,
    pub(crate) poll_interval: Duration,
    pub(crate) snapshot_tx: watch::Sender<Arc<RootChainSnapshot>>,
    pub(crate) status_tx: watch::Sender<RootChainStatus>,
}

/// Polls the root chain until a fatal error occurs.
pub(crate) async fn reader_task<C, U>(mut state: ReaderState, ctx: ReaderCtx<C, U>) -> Result<()>
where
    C: RootChainClient,
    U: UtxoDatabase,
{
    loop {
        if let Err(err) = poll_and_report(&mut state, &ctx).await {
            if err.is_fatal() {
                error!(%err, "root chain reader stopped");
                return Err(err);
            }
            warn!(%err, "root chain poll failed");
        }

        sleep(ctx.poll_interval).await;
    }
}

/// Runs one poll and records a failure in the status channel.
pub(crate) async fn poll_and_report<C, U>(
    state: &mut ReaderState,
    ctx: &ReaderCtx<C, U>,
) -> Result<()>
where
    C: RootChainClient,
    U: UtxoDatabase,
{
    let res = poll_once(state, ctx).await;
    if let Err(err) = &res {
        let mut updates = vec![StatusUpdate::RpcError(err.to_string())];
        if matches!(err, SyncError::Client(_)) {
            updates.push(StatusUpdate::Connected(false));
        }
        apply_status_updates(&updates, &ctx.status_tx);
    }
    res
}

pub(crate) async fn poll_once<C, U>(state: &mut ReaderState, ctx: &ReaderCtx<C, U>) -> Result<()>
where
    C: RootChainClient,
    U: UtxoDatabase,
{
    let client = ctx.client.as_ref();
    let tip = call_with_retry(&ctx.policy, "block_number", || client.block_number()).await?;

    check_reorg(state, ctx).await?;

    if let Some(target) = tip.checked_sub(ctx.finality) {
        scan_until(state, ctx, target).await?;
    }

    let pending_deposits = fetch_pending_deposits(ctx, state.next_height(), tip).await?;
    let challengeable = find_challengeable(state, ctx).await?;

    let now = unix_millis();
    publish(state, ctx, tip, now, pending_deposits, challengeable);

    let mut updates = vec![
        StatusUpdate::Connected(true),
        StatusUpdate::Tip(tip),
        StatusUpdate::LastUpdate(now),
    ];
    if let Some(scanned) = state.scanned() {
        updates.push(StatusUpdate::Scanned(scanned));
    }
    apply_status_updates(&updates, &ctx.status_tx);

    Ok(())
}

async fn fetch_hash<C, U>(ctx: &ReaderCtx<C, U>, height: u64) -> Result<Option<Buf32>>
where
    C: RootChainClient,
{
    let client = ctx.client.as_ref();
    Ok(call_with_retry(&ctx.policy, "block_hash", || client.block_hash(height)).await?)
}

/// Compares the newest scanned block with the chain and rewinds to the fork
/// point if it was replaced.
async fn check_reorg<C, U>(state: &mut ReaderState, ctx: &ReaderCtx<C, U>) -> Result<()>
where
    C: RootChainClient,
{
    let Some((height, hash)) = state.last_checkpoint() else {
        return Ok(());
    };
    if fetch_hash(ctx, height).await? == Some(hash) {
        return Ok(());
    }

    warn!(%height, "scanned root chain block was replaced, searching for fork point");

    let checkpoints: Vec<_> = state.checkpoints().skip(1).collect();
    match find_pivot(ctx, &checkpoints).await? {
        Some(pivot) => {
            info!(%pivot, "rewinding root chain events to fork point");
            state.rollback_to(Some(pivot));
        }
        None if !state.has_pruned() => {
            info!("no scanned block survived, rescanning from the start block");
            state.rollback_to(None);
        }
        None => {
            let oldest = checkpoints.last().map_or(height, |(h, _)| *h);
            error!(%oldest, "no fork point within the tracked window");
            return Err(SyncError::NoCommonAncestor { oldest });
        }
    }

    Ok(())
}

/// Finds the newest checkpoint still on the chain.
async fn find_pivot<C, U>(ctx: &ReaderCtx<C, U>, checkpoints: &[(u64, Buf32)]) -> Result<Option<u64>>
where
    C: RootChainClient,
{
    for (height, hash) in checkpoints {
        debug!(%height, "checking block for fork point");
        if fetch_hash(ctx, *height).await? == Some(*hash) {
            return Ok(Some(*height));
        }
    }
    Ok(None)
}

/// Scans final blocks up to `target` in `max_log_range` sized ranges.
async fn scan_until<C, U>(state: &mut ReaderState, ctx: &ReaderCtx<C, U>, target: u64) -> Result<()>
where
    C: RootChainClient,
{
    let client = ctx.client.as_ref();

    while state.next_height() <= target {
        let from = state.next_height();
        let to = target.min(from.saturating_add(ctx.max_log_range.max(1) - 1));

        let hash = fetch_hash(ctx, to)
            .await?
            .ok_or(SyncError::MissingBlock(to))?;
        let events = call_with_retry(&ctx.policy, "events", || client.events(from, to)).await?;

        // the logs may come from a branch that got replaced meanwhile
        if fetch_hash(ctx, to).await? != Some(hash) {
            debug!(%from, %to, "root chain moved during scan");
            break;
        }

        debug!(%from, %to, events = %events.len(), "scanned root chain range");
        state.push(ScannedRange { to, hash, events });
    }

    Ok(())
}

/// Deposits in blocks `from..=tip`, not final yet.
async fn fetch_pending_deposits<C, U>(
    ctx: &ReaderCtx<C, U>,
    from: u64,
    tip: u64,
) -> Result<BTreeMap<u64, Deposit>>
where
    C: RootChainClient,
{
    let client = ctx.client.as_ref();
    let mut deposits = BTreeMap::new();

    let mut start = from;
    while start <= tip {
        let end = tip.min(start.saturating_add(ctx.max_log_range.max(1) - 1));
        let events =
            call_with_retry(&ctx.policy, "events", || client.events(start, end)).await?;

        for event in events {
            if let EventKind::Deposit(deposit) = event.kind {
                deposits.insert(deposit.nonce, deposit);
            }
        }
        start = end + 1;
    }

    Ok(deposits)
}

/// Pending exits whose output is already spent locally.
///
/// Newly found ones are checked against the contract first, since its state
/// can be ahead of the final events.
async fn find_challengeable<C, U>(
    state: &ReaderState,
    ctx: &ReaderCtx<C, U>,
) -> Result<BTreeSet<Position>>
where
    C: RootChainClient,
    U: UtxoDatabase,
{
    let client = ctx.client.as_ref();
    let known = ctx.snapshot_tx.borrow().challengeable.clone();
    let mut challengeable = BTreeSet::new();

    for (position, exit) in pending_exits(&state.current().exits) {
        // read-only: spent flags of the consensus store, never written here
        let spent = ctx
            .utxo_db
            .get_utxo_by_position(position)?
            .is_some_and(|utxo| !utxo.valid);
        if !spent {
            continue;
        }

        if !known.contains(position) {
            let position = *position;
            let onchain =
                call_with_retry(&ctx.policy, "exit_state", || client.exit_state(position)).await?;
            if onchain != ExitState::Pending {
                debug!(%position, ?onchain, "exit on spent output already resolved");
                continue;
            }

            warn!(
                %position,
                owner = %exit.owner,
                amount = %exit.amount,
                started_at = %exit.created_at,
                "exit started on a spent output, needs a challenge"
            );
        }

        challengeable.insert(*position);
    }

    Ok(challengeable)
}

fn pending_exits(
    exits: &BTreeMap<Position, ExitRecord>,
) -> impl Iterator<Item = (&Position, &ExitRecord)> {
    exits
        .iter()
        .filter(|(_, exit)| exit.state == ExitState::Pending)
}

fn publish<C, U>(
    state: &ReaderState,
    ctx: &ReaderCtx<C, U>,
    tip: u64,
    now_ms: u64,
    pending_deposits: BTreeMap<u64, Deposit>,
    challengeable: BTreeSet<Position>,
) {
    let prev = ctx.snapshot_tx.borrow().clone();
    let current = state.current();

    let snapshot = RootChainSnapshot {
        operator: prev.operator,
        finality: prev.finality,
        staleness_bound: prev.staleness_bound,
        tip,
        scanned: state.scanned().unwrap_or_default(),
        synced_at: Some(now_ms / 1_000),
        deposits: current.deposits.clone(),
        pending_deposits,
        exits: current.exits.clone(),
        challengeable,
    };

    trace!(?snapshot, "publishing root chain snapshot");
    ctx.snapshot_tx.send_replace(Arc::new(snapshot));
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
