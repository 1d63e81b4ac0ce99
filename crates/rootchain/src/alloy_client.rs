//! [`RootChainClient`] over an Ethereum JSON-RPC node.

use std::{fmt, fs, path::Path, str::FromStr};

use alloy::{
    network::EthereumWallet,
    primitives::{Address as EthAddress, FixedBytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, Filter, Log},
    signers::local::PrivateKeySigner,
    sol_types::SolEvent,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use plasma_primitives::{
    buf::{Address, Buf32},
    position::Position,
};
use plasma_state::{deposit::Deposit, exit::ExitState};
use tracing::*;

use crate::{
    client::{ChainEvent, ClientError, EventKind, HeaderBatch, RootChainClient},
    contract::PlasmaMVP,
};

/// Root contract client backed by an alloy HTTP provider.
///
/// Without a signer the client can read but `submit_block` fails.
#[derive(Clone)]
pub struct AlloyRootChainClient {
    provider: DynProvider,
    contract: PlasmaMVP::PlasmaMVPInstance<DynProvider>,
    has_signer: bool,
}

impl fmt::Debug for AlloyRootChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyRootChainClient")
            .field("contract", self.contract.address())
            .field("has_signer", &self.has_signer)
            .finish()
    }
}

impl AlloyRootChainClient {
    pub fn new(
        node_url: &str,
        contract: Address,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, ClientError> {
        let url = Url::parse(node_url).map_err(|e| ClientError::malformed("node url", e))?;

        let has_signer = signer.is_some();
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        let contract = PlasmaMVP::new(EthAddress::from(contract.0), provider.clone());

        Ok(Self {
            provider,
            contract,
            has_signer,
        })
    }
}

/// Reads a hex-encoded secp256k1 key from `path`.
pub fn read_operator_key(path: &Path) -> Result<PrivateKeySigner, ClientError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ClientError::Signer(format!("reading {}: {e}", path.display())))?;
    let hex = raw.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    PrivateKeySigner::from_str(hex).map_err(|e| ClientError::Signer(e.to_string()))
}

/// Plasma address of a signer.
pub fn signer_address(signer: &PrivateKeySigner) -> Address {
    Address(signer.address().into_array())
}

fn rpc_err(err: impl fmt::Display) -> ClientError {
    ClientError::Rpc(err.to_string())
}

fn to_u64(value: U256, what: &'static str) -> Result<u64, ClientError> {
    u64::try_from(value).map_err(|_| ClientError::malformed(what, value))
}

fn to_address(addr: EthAddress) -> Address {
    Address(addr.into_array())
}

/// Position of a transaction exit, `[block, txIndex, outputIndex]`.
fn tx_exit_position(pos: &[U256; 3]) -> Result<Position, ClientError> {
    let block = to_u64(pos[0], "exit block")?;
    let tx_index = u16::try_from(pos[1]).map_err(|_| ClientError::malformed("exit tx index", pos[1]))?;
    let output = u8::try_from(pos[2]).map_err(|_| ClientError::malformed("exit output", pos[2]))?;
    Ok(Position::tx_output(block, tx_index, output))
}

/// Position of any exit, `[block, txIndex, outputIndex, depositNonce]`.
fn exit_position(pos: &[U256; 4]) -> Result<Position, ClientError> {
    let nonce = to_u64(pos[3], "exit nonce")?;
    if nonce != 0 {
        return Ok(Position::deposit(nonce));
    }
    tx_exit_position(&[pos[0], pos[1], pos[2]])
}

fn decode<E: SolEvent>(log: &Log) -> Result<E, ClientError> {
    log.log_decode::<E>()
        .map(|decoded| decoded.inner.data)
        .map_err(|e| ClientError::malformed("log", e))
}

/// Decodes a contract log.  Logs of other events give `None`.
pub(crate) fn decode_log(log: &Log) -> Result<Option<ChainEvent>, ClientError> {
    let Some(topic) = log.topic0().copied() else {
        return Ok(None);
    };
    let block_num = log
        .block_number
        .ok_or_else(|| ClientError::malformed("log", "missing block number"))?;

    let kind = if topic == PlasmaMVP::Deposit::SIGNATURE_HASH {
        let ev = decode::<PlasmaMVP::Deposit>(log)?;
        EventKind::Deposit(Deposit::new(
            to_u64(ev.depositNonce, "deposit nonce")?,
            to_address(ev.depositor),
            to_u64(ev.amount, "deposit amount")?,
            to_u64(ev.ethBlockNum, "deposit block")?,
        ))
    } else if topic == PlasmaMVP::StartedTransactionExit::SIGNATURE_HASH {
        let ev = decode::<PlasmaMVP::StartedTransactionExit>(log)?;
        EventKind::ExitStarted {
            position: tx_exit_position(&ev.position)?,
            owner: to_address(ev.owner),
            amount: to_u64(ev.amount, "exit amount")?,
        }
    } else if topic == PlasmaMVP::StartedDepositExit::SIGNATURE_HASH {
        let ev = decode::<PlasmaMVP::StartedDepositExit>(log)?;
        EventKind::ExitStarted {
            position: Position::deposit(to_u64(ev.nonce, "exit nonce")?),
            owner: to_address(ev.owner),
            amount: to_u64(ev.amount, "exit amount")?,
        }
    } else if topic == PlasmaMVP::ChallengedExit::SIGNATURE_HASH {
        let ev = decode::<PlasmaMVP::ChallengedExit>(log)?;
        EventKind::ExitChallenged {
            position: exit_position(&ev.position)?,
        }
    } else if topic == PlasmaMVP::FinalizedExit::SIGNATURE_HASH {
        let ev = decode::<PlasmaMVP::FinalizedExit>(log)?;
        EventKind::ExitFinalized {
            position: exit_position(&ev.position)?,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(ChainEvent::new(block_num, kind)))
}

#[async_trait]
impl RootChainClient for AlloyRootChainClient {
    async fn block_number(&self) -> Result<u64, ClientError> {
        self.provider.get_block_number().await.map_err(rpc_err)
    }

    async fn block_hash(&self, number: u64) -> Result<Option<Buf32>, ClientError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(rpc_err)?;
        Ok(block.map(|b| Buf32(b.header.hash.0)))
    }

    async fn events(&self, from: u64, to: u64) -> Result<Vec<ChainEvent>, ClientError> {
        let filter = Filter::new()
            .address(*self.contract.address())
            .from_block(from)
            .to_block(to);
        let logs = self.provider.get_logs(&filter).await.map_err(rpc_err)?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_log(log) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                // one unrepresentable log must not stall the reader
                Err(err) => warn!(%err, tx = ?log.transaction_hash, "skipping contract log"),
            }
        }
        Ok(events)
    }

    async fn operator(&self) -> Result<Address, ClientError> {
        let operator = self.contract.operator().call().await.map_err(rpc_err)?;
        Ok(to_address(operator))
    }

    async fn exit_state(&self, position: Position) -> Result<ExitState, ClientError> {
        let state = if position.is_deposit() {
            self.contract
                .depositExits(U256::from(position.deposit_nonce()))
                .call()
                .await
                .map_err(rpc_err)?
                .state
        } else {
            self.contract
                .txExits(U256::from(position.priority().value()))
                .call()
                .await
                .map_err(rpc_err)?
                .state
        };

        ExitState::from_contract(state).ok_or_else(|| ClientError::malformed("exit state", state))
    }

    async fn last_committed_block(&self) -> Result<u64, ClientError> {
        let last = self
            .contract
            .lastCommittedBlock()
            .call()
            .await
            .map_err(rpc_err)?;
        to_u64(last, "last committed block")
    }

    async fn submit_block(&self, batch: HeaderBatch) -> Result<Buf32, ClientError> {
        if !self.has_signer {
            return Err(ClientError::Signer("no operator key loaded".to_owned()));
        }

        let headers = batch.headers.iter().map(|h| FixedBytes::from(h.0)).collect();
        let txn_counts = batch.txn_counts.iter().map(|c| U256::from(*c)).collect();
        let fees = batch.fees.iter().map(|f| U256::from(*f)).collect();

        let pending = self
            .contract
            .submitBlock(headers, txn_counts, fees, U256::from(batch.first_block))
            .send()
            .await
            .map_err(rpc_err)?;
        debug!(tx = %pending.tx_hash(), "submitBlock sent");

        let receipt = pending.get_receipt().await.map_err(rpc_err)?;
        let tx = Buf32(receipt.transaction_hash.0);
        if !receipt.status() {
            return Err(ClientError::Reverted(tx));
        }
        Ok(tx)
    }
}
