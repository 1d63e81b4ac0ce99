use std::path::PathBuf;

use plasma_primitives::buf::Address;
use serde::{Deserialize, Serialize};

/// Default value for `node_url` in [`RootChainConfig`].
const DEFAULT_NODE_URL: &str = "http://localhost:8545";

/// Number of root-chain blocks after which a block is treated as final.
const DEFAULT_BLOCK_FINALITY: u64 = 16;

/// Minimum time between two header submissions, in seconds.
const DEFAULT_COMMITMENT_RATE_SECS: u64 = 60;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_REORG_DEPTH: u64 = 64;
const DEFAULT_STALENESS_BOUND_SECS: u64 = 120;
const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RPC_RETRY_COUNT: u16 = 3;
const DEFAULT_RPC_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_MAX_LOG_RANGE: u64 = 1_000;
const DEFAULT_MAX_HEADERS_PER_SUBMISSION: usize = 256;

/// Connection to the root contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootChainConfig {
    /// JSON-RPC endpoint of the Ethereum node.
    #[serde(default = "default_node_url")]
    pub node_url: String,

    /// Address of the deployed plasma contract.
    pub contract_address: Address,

    /// File holding the hex-encoded operator private key.  Only the operator
    /// submits block headers, so nodes without a key run the reader alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_key: Option<PathBuf>,

    /// Confirmations before a root-chain block is trusted.
    #[serde(default = "default_block_finality")]
    pub block_finality: u64,

    /// Minimum number of seconds between header submissions.
    #[serde(default = "default_commitment_rate_secs")]
    pub commitment_rate_secs: u64,

    /// Root-chain block the contract was deployed in.  Event scanning starts
    /// here.
    #[serde(default)]
    pub start_block: u64,
}

impl RootChainConfig {
    pub fn is_operator(&self) -> bool {
        self.operator_key.is_some()
    }
}

fn default_node_url() -> String {
    DEFAULT_NODE_URL.to_owned()
}

fn default_block_finality() -> u64 {
    DEFAULT_BLOCK_FINALITY
}

fn default_commitment_rate_secs() -> u64 {
    DEFAULT_COMMITMENT_RATE_SECS
}

/// Tuning of the synchronizer tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often the reader polls for new root-chain blocks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of scanned block hashes kept to detect reorgs.
    #[serde(default = "default_reorg_depth")]
    pub reorg_depth: u64,

    /// Exit status older than this many seconds is refused.
    #[serde(default = "default_staleness_bound_secs")]
    pub staleness_bound_secs: u64,

    /// Timeout applied to every RPC call.
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,

    /// Retries after the first failed attempt of an RPC call.
    #[serde(default = "default_rpc_retry_count")]
    pub rpc_retry_count: u16,

    /// Delay before the first retry, doubled on each further one.
    #[serde(default = "default_rpc_retry_backoff_ms")]
    pub rpc_retry_backoff_ms: u64,

    /// Largest block range requested in one log query.
    #[serde(default = "default_max_log_range")]
    pub max_log_range: u64,

    /// Largest number of headers sent in one `submitBlock` call.
    #[serde(default = "default_max_headers_per_submission")]
    pub max_headers_per_submission: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reorg_depth: DEFAULT_REORG_DEPTH,
            staleness_bound_secs: DEFAULT_STALENESS_BOUND_SECS,
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            rpc_retry_count: DEFAULT_RPC_RETRY_COUNT,
            rpc_retry_backoff_ms: DEFAULT_RPC_RETRY_BACKOFF_MS,
            max_log_range: DEFAULT_MAX_LOG_RANGE,
            max_headers_per_submission: DEFAULT_MAX_HEADERS_PER_SUBMISSION,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_reorg_depth() -> u64 {
    DEFAULT_REORG_DEPTH
}

fn default_staleness_bound_secs() -> u64 {
    DEFAULT_STALENESS_BOUND_SECS
}

fn default_rpc_timeout_ms() -> u64 {
    DEFAULT_RPC_TIMEOUT_MS
}

fn default_rpc_retry_count() -> u16 {
    DEFAULT_RPC_RETRY_COUNT
}

fn default_rpc_retry_backoff_ms() -> u64 {
    DEFAULT_RPC_RETRY_BACKOFF_MS
}

fn default_max_log_range() -> u64 {
    DEFAULT_MAX_LOG_RANGE
}

fn default_max_headers_per_submission() -> usize {
    DEFAULT_MAX_HEADERS_PER_SUBMISSION
}
