//! Plasma MVP child chain node.
//!
//! Opens the chain store and runs the root-chain synchronizer.  Operators
//! with a configured key also submit committed block headers.

mod args;

use std::sync::Arc;

use anyhow::Context;
use args::Args;
use futures::{future, FutureExt};
use plasma_common::logging;
use plasma_config::Config;
use plasma_db_store_sled::{open_sled_backend, SledDbConfig, SLED_NAME};
use plasma_db_types::traits::{DatabaseBackend, PlasmaDatabase, UtxoDatabase};
use plasma_query::QueryService;
use plasma_rootchain::{
    alloy_client::{read_operator_key, signer_address, AlloyRootChainClient},
    verify_operator, RootChainStatus, RootChainSyncBuilder,
};
use tokio::{runtime, signal, sync::watch};
use tracing::*;

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e:#}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    if let Some(datadir) = args.datadir {
        config.client.datadir = datadir;
    }

    // Init the logging before we do anything else.
    logging::init_logging_from_config("plasma-node", &config.logging);

    let rt = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("plasma-rt")
        .build()
        .context("init: build rt")?;

    rt.block_on(run(config, !args.no_submit))
}

async fn run(config: Config, submit: bool) -> anyhow::Result<()> {
    let db_config = SledDbConfig::new_with_constant_backoff(
        config.client.db_retry_count,
        config.client.db_retry_delay_ms,
    );
    let backend = open_sled_backend(&config.client.datadir, SLED_NAME, db_config)?;
    let utxo_db = backend.utxo_db();
    let plasma_db = backend.plasma_db();
    info!(datadir = %config.client.datadir.display(), "opened chain store");

    let signer = config
        .rootchain
        .operator_key
        .as_deref()
        .map(read_operator_key)
        .transpose()
        .context("reading operator key")?;
    let configured = signer.as_ref().map(signer_address);

    let client = Arc::new(AlloyRootChainClient::new(
        &config.rootchain.node_url,
        config.rootchain.contract_address,
        signer,
    )?);
    info!(
        node_url = %config.rootchain.node_url,
        contract = %config.rootchain.contract_address,
        "connecting to root chain"
    );

    let operator = verify_operator(client.as_ref(), &config.sync, configured).await?;

    let (handle, reader, writer) = RootChainSyncBuilder::new(
        client,
        utxo_db.clone(),
        plasma_db.clone(),
        operator,
        config.rootchain.clone(),
        config.sync.clone(),
    )
    .with_header_submission(submit && config.rootchain.is_operator())
    .build();

    let reader = tokio::spawn(reader);
    let writer = match writer {
        Some(task) => {
            info!("header submission enabled");
            tokio::spawn(task).boxed()
        }
        None => future::pending().boxed(),
    };

    let query = QueryService::new(utxo_db, plasma_db);
    let reporter = tokio::spawn(report_status(query, handle.status_watcher()));

    let res = tokio::select! {
        res = reader => res
            .context("reader task panicked")?
            .context("root-chain reader failed"),
        res = writer => {
            res.context("writer task panicked")?;
            warn!("header writer exited");
            Ok(())
        }
        res = signal::ctrl_c() => {
            res.context("listening for ctrl-c")?;
            info!("received shutdown signal");
            Ok(())
        }
    };

    reporter.abort();
    drop(handle);
    res
}

/// Logs connection transitions and header submissions along with the local
/// chain height.
async fn report_status<U: UtxoDatabase, P: PlasmaDatabase>(
    query: QueryService<U, P>,
    mut status_rx: watch::Receiver<RootChainStatus>,
) {
    let mut prev = RootChainStatus::default();

    while status_rx.changed().await.is_ok() {
        let status = status_rx.borrow_and_update().clone();

        if status.connected != prev.connected || status.last_error != prev.last_error {
            match &status.last_error {
                Some(err) => warn!(%err, "root chain unreachable"),
                None => info!(tip = ?status.tip, scanned = ?status.scanned, "root chain connected"),
            }
        }

        if status.last_submitted_block != prev.last_submitted_block {
            let height = query.height().unwrap_or_else(|e| {
                warn!(%e, "reading chain height");
                None
            });
            info!(
                submitted = ?status.last_submitted_block,
                tx = ?status.last_submission_tx,
                ?height,
                "headers committed to root chain"
            );
        }

        prev = status;
    }
}
