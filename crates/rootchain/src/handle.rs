use std::{future::Future, sync::Arc, time::Duration};

use plasma_config::{RootChainConfig, SyncConfig};
use plasma_db_types::traits::{PlasmaDatabase, UtxoDatabase};
use plasma_primitives::buf::Address;
use tokio::sync::{mpsc, watch};
use tracing::*;

use crate::{
    client::RootChainClient,
    error::{Result, SyncError},
    reader::{reader_task, ReaderCtx, ReaderState},
    retry::{call_with_retry, RetryPolicy},
    snapshot::RootChainSnapshot,
    status::RootChainStatus,
    writer::{writer_task, FlushHandle, WriterCtx},
};

/// Handle for reading synchronizer output and requesting header flushes.
#[derive(Clone, Debug)]
pub struct RootChainHandle {
    snapshot_rx: watch::Receiver<Arc<RootChainSnapshot>>,
    status_rx: watch::Receiver<RootChainStatus>,
    flush: FlushHandle,
}

impl RootChainHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<RootChainSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Returns a watcher for snapshot updates.
    pub fn snapshot_watcher(&self) -> watch::Receiver<Arc<RootChainSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Returns a watcher for connection status updates.
    pub fn status_watcher(&self) -> watch::Receiver<RootChainStatus> {
        self.status_rx.clone()
    }

    /// Header sink to hand to the chain executor.
    pub fn flush_handle(&self) -> FlushHandle {
        self.flush.clone()
    }
}

/// Builder for the root-chain reader and writer tasks.
#[derive(Debug)]
pub struct RootChainSyncBuilder<C, U, P> {
    client: Arc<C>,
    utxo_db: Arc<U>,
    plasma_db: Arc<P>,
    operator: Address,
    rootchain: RootChainConfig,
    sync: SyncConfig,
    submit_headers: bool,
}

impl<C, U, P> RootChainSyncBuilder<C, U, P> {
    /// Creates a builder.  `operator` is the contract's operator address,
    /// see [`verify_operator`].
    pub fn new(
        client: Arc<C>,
        utxo_db: Arc<U>,
        plasma_db: Arc<P>,
        operator: Address,
        rootchain: RootChainConfig,
        sync: SyncConfig,
    ) -> Self {
        let submit_headers = rootchain.is_operator();
        Self {
            client,
            utxo_db,
            plasma_db,
            operator,
            rootchain,
            sync,
            submit_headers,
        }
    }

    /// Overrides whether the writer task is built.  Defaults to whether an
    /// operator key is configured.
    pub fn with_header_submission(mut self, enabled: bool) -> Self {
        self.submit_headers = enabled;
        self
    }

    /// Builds the handle, the reader task and, for operators, the writer
    /// task.
    ///
    /// The reader task only returns on a fatal error.  The writer task
    /// returns once every [`FlushHandle`] is dropped.
    pub fn build(
        self,
    ) -> (
        RootChainHandle,
        impl Future<Output = Result<()>>,
        Option<impl Future<Output = ()>>,
    )
    where
        C: RootChainClient,
        U: UtxoDatabase,
        P: PlasmaDatabase,
    {
        let policy = RetryPolicy::from_config(&self.sync);

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(RootChainSnapshot::unsynced(
            self.operator,
            self.rootchain.block_finality,
            self.sync.staleness_bound_secs,
        )));
        let (status_tx, status_rx) = watch::channel(RootChainStatus::default());

        let (flush, writer) = if self.submit_headers {
            let (flush_tx, flush_rx) = mpsc::channel(1);
            let commitment_rate = Duration::from_secs(self.rootchain.commitment_rate_secs);
            let ctx = WriterCtx {
                client: self.client.clone(),
                plasma_db: self.plasma_db,
                policy,
                submit_timeout: policy.timeout.max(commitment_rate),
                commitment_rate,
                max_headers: self.sync.max_headers_per_submission,
                status_tx: status_tx.clone(),
            };
            (
                FlushHandle::new(flush_tx),
                Some(writer_task(ctx, flush_rx)),
            )
        } else {
            (FlushHandle::disabled(), None)
        };

        let reader_ctx = ReaderCtx {
            client: self.client,
            utxo_db: self.utxo_db,
            policy,
            finality: self.rootchain.block_finality,
            max_log_range: self.sync.max_log_range,
            poll_interval: Duration::from_millis(self.sync.poll_interval_ms),
            snapshot_tx,
            status_tx,
        };
        let state = ReaderState::new(self.rootchain.start_block, self.sync.reorg_depth);
        let reader = reader_task(state, reader_ctx);

        let handle = RootChainHandle {
            snapshot_rx,
            status_rx,
            flush,
        };

        (handle, reader, writer)
    }
}

/// Fetches the contract operator and checks it against the address of the
/// configured operator key.  Returns the contract operator.
pub async fn verify_operator<C: RootChainClient>(
    client: &C,
    sync: &SyncConfig,
    configured: Option<Address>,
) -> Result<Address> {
    let policy = RetryPolicy::from_config(sync);
    let contract = call_with_retry(&policy, "operator", || client.operator()).await?;

    match configured {
        Some(configured) if configured != contract => {
            error!(%configured, %contract, "operator key does not match the contract");
            Err(SyncError::OperatorMismatch {
                configured,
                contract,
            })
        }
        Some(_) => {
            info!(operator = %contract, "running as root contract operator");
            Ok(contract)
        }
        None => {
            info!(operator = %contract, "running without operator key");
            Ok(contract)
        }
    }
}

#[cfg(test)]
mod tests {
    use plasma_chaintsn::{HeaderSink, RootChainView};
    use plasma_db_store_sled::{plasma::db::PlasmaDBSled, utxo::db::UtxoDBSled, SledDbConfig};
    use plasma_primitives::buf::Buf32;

    use super::*;
    use crate::client::MockRootChainClient;

    const OPERATOR: Address = Address([9; 20]);

    fn rootchain_config(operator_key: bool) -> RootChainConfig {
        RootChainConfig {
            node_url: "http://localhost:8545".to_owned(),
            contract_address: Address([5; 20]),
            operator_key: operator_key.then(|| "operator.key".into()),
            block_finality: 2,
            commitment_rate_secs: 60,
            start_block: 0,
        }
    }

    fn fast_sync_config() -> SyncConfig {
        SyncConfig {
            poll_interval_ms: 10,
            rpc_timeout_ms: 200,
            rpc_retry_count: 0,
            ..SyncConfig::default()
        }
    }

    fn dbs() -> (Arc<UtxoDBSled>, Arc<PlasmaDBSled>) {
        let db = Arc::new(sled::Config::new().temporary(true).open().unwrap());
        (
            Arc::new(UtxoDBSled::new(db.clone(), SledDbConfig::test()).unwrap()),
            Arc::new(PlasmaDBSled::new(db, SledDbConfig::test()).unwrap()),
        )
    }

    #[tokio::test]
    async fn test_verify_operator() {
        let mut client = MockRootChainClient::new();
        client.expect_operator().returning(|| Ok(OPERATOR));
        let sync = fast_sync_config();

        assert_eq!(verify_operator(&client, &sync, None).await.unwrap(), OPERATOR);
        assert_eq!(
            verify_operator(&client, &sync, Some(OPERATOR)).await.unwrap(),
            OPERATOR
        );

        let err = verify_operator(&client, &sync, Some(Address([1; 20])))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::OperatorMismatch { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_reader_publishes_snapshot() {
        let mut client = MockRootChainClient::new();
        client.expect_block_number().returning(|| Ok(10));
        client
            .expect_block_hash()
            .returning(|n| Ok(Some(Buf32([n as u8; 32]))));
        client.expect_events().returning(|_, _| Ok(vec![]));

        let (utxo_db, plasma_db) = dbs();
        let (handle, reader, writer) = RootChainSyncBuilder::new(
            Arc::new(client),
            utxo_db,
            plasma_db,
            OPERATOR,
            rootchain_config(false),
            fast_sync_config(),
        )
        .build();

        assert!(writer.is_none());
        assert!(!handle.flush_handle().is_enabled());
        // unsynced until the first poll
        assert!(handle.snapshot().deposit(1).is_err());

        let mut watcher = handle.snapshot_watcher();
        let task = tokio::spawn(reader);
        watcher.changed().await.unwrap();
        task.abort();

        let snap = handle.snapshot();
        assert_eq!(snap.operator_address(), OPERATOR);
        assert_eq!(snap.tip(), 10);
        assert_eq!(snap.scanned(), 8);
        assert_eq!(snap.deposit(1), Ok(None));
        assert!(handle.status_watcher().borrow().connected);
    }

    #[tokio::test]
    async fn test_operator_gets_writer() {
        let mut client = MockRootChainClient::new();
        client.expect_last_committed_block().returning(|| Ok(0));

        let (utxo_db, plasma_db) = dbs();
        let (handle, _reader, writer) = RootChainSyncBuilder::new(
            Arc::new(client),
            utxo_db,
            plasma_db,
            OPERATOR,
            rootchain_config(true),
            fast_sync_config(),
        )
        .build();

        let flush = handle.flush_handle();
        assert!(flush.is_enabled());
        flush.flush_headers(None);

        // the writer exits once every flush handle is gone
        let writer = tokio::spawn(writer.unwrap());
        drop(flush);
        drop(handle);
        writer.await.unwrap();
    }
}
