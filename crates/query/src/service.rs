use std::sync::Arc;

use plasma_db_types::{
    traits::{PlasmaDatabase, UtxoDatabase},
    DbError,
};
use plasma_primitives::{
    buf::{Address, Buf32},
    position::Position,
};
use plasma_state::{tx_record::TxRecord, utxo::Utxo};
use tracing::*;

use crate::{
    errors::{QueryError, QueryResult},
    types::{BlockInfo, BlocksResponse, OutputInfo},
};

/// Largest number of blocks returned by [`QueryService::blocks`].
pub const MAX_BLOCKS_PER_QUERY: u64 = 10;

/// Answers read-only queries from the chain store.
///
/// Reads go straight to the databases and never block on the consensus
/// path.
#[derive(Debug)]
pub struct QueryService<U, P> {
    utxo_db: Arc<U>,
    plasma_db: Arc<P>,
}

impl<U: UtxoDatabase, P: PlasmaDatabase> QueryService<U, P> {
    pub fn new(utxo_db: Arc<U>, plasma_db: Arc<P>) -> Self {
        Self { utxo_db, plasma_db }
    }

    /// Sum of the unspent outputs of `owner`.
    pub fn balance(&self, owner: &Address) -> QueryResult<u64> {
        let total = self
            .unspent_for(owner)?
            .iter()
            .fold(0u64, |acc, utxo| acc.saturating_add(utxo.amount));
        Ok(total)
    }

    /// Unspent outputs of `owner` in position order.
    pub fn info(&self, owner: &Address) -> QueryResult<Vec<OutputInfo>> {
        self.unspent_for(owner)?
            .into_iter()
            .map(|utxo| self.output_info(utxo))
            .collect()
    }

    /// Number of the latest committed plasma block.
    pub fn height(&self) -> QueryResult<Option<u64>> {
        Ok(self.plasma_db.get_latest_block_num()?)
    }

    pub fn block(&self, number: u64) -> QueryResult<BlockInfo> {
        if number == 0 {
            return Err(QueryError::InvalidBlockNumber(number));
        }

        self.plasma_db
            .get_block(number)?
            .map(|block| BlockInfo::new(number, block))
            .ok_or(QueryError::BlockNotFound(number))
    }

    /// Up to [`MAX_BLOCKS_PER_QUERY`] blocks from `start`, or the latest ones
    /// if `start` is `None`.
    pub fn blocks(&self, start: Option<u64>) -> QueryResult<BlocksResponse> {
        let starting_block = match start {
            Some(0) => return Err(QueryError::InvalidBlockNumber(0)),
            Some(n) => n,
            None => self
                .plasma_db
                .get_latest_block_num()?
                .map_or(1, |latest| {
                    latest.saturating_sub(MAX_BLOCKS_PER_QUERY - 1).max(1)
                }),
        };

        let blocks = self
            .plasma_db
            .get_blocks_from(starting_block, MAX_BLOCKS_PER_QUERY as usize)?
            .into_iter()
            .map(|(number, block)| BlockInfo::new(number, block))
            .collect();

        Ok(BlocksResponse {
            starting_block,
            blocks,
        })
    }

    /// The output at `position` with its creating transaction.
    pub fn output(&self, position: &Position) -> QueryResult<OutputInfo> {
        let utxo = self
            .utxo_db
            .get_utxo_by_position(position)?
            .ok_or(QueryError::OutputNotFound(*position))?;
        self.output_info(utxo)
    }

    /// Applied transaction by merkle hash.
    pub fn tx(&self, merkle_hash: &Buf32) -> QueryResult<TxRecord> {
        self.plasma_db
            .get_tx_record(merkle_hash)?
            .ok_or(QueryError::TxNotFound(*merkle_hash))
    }

    fn unspent_for(&self, owner: &Address) -> QueryResult<Vec<Utxo>> {
        let all = self.utxo_db.get_utxos_for_owner(owner, true)?;
        if all.is_empty() {
            return Err(QueryError::UnknownAddress(*owner));
        }
        Ok(all.into_iter().filter(|utxo| utxo.valid).collect())
    }

    fn output_info(&self, utxo: Utxo) -> QueryResult<OutputInfo> {
        let tx = match &utxo.merkle_hash {
            Some(hash) => {
                let record = self.plasma_db.get_tx_record(hash)?;
                if record.is_none() {
                    warn!(position = %utxo.position, %hash, "output without transaction record");
                }
                record
            }
            None => None,
        };

        let confirm_sigs = self.plasma_db.get_confirm_sigs(&utxo.position)?;
        let spent_by = self.spender_hash(&utxo)?;

        Ok(OutputInfo {
            utxo,
            tx,
            confirm_sigs,
            spent_by,
        })
    }

    /// Merkle hash of the transaction that created the outputs spending
    /// `utxo`.
    fn spender_hash(&self, utxo: &Utxo) -> QueryResult<Option<Buf32>> {
        let Some(key) = utxo.spender_keys.first() else {
            return Ok(None);
        };

        let position = key
            .position()
            .map_err(|e| DbError::CodecError(format!("spender key {key}: {e}")))?;
        Ok(self
            .utxo_db
            .get_utxo(&key.owner(), &position)?
            .and_then(|spender| spender.merkle_hash))
    }
}

#[cfg(test)]
mod tests {
    use plasma_db_store_sled::{plasma::db::PlasmaDBSled, utxo::db::UtxoDBSled, SledDbConfig};
    use plasma_primitives::buf::Signature;
    use plasma_state::{
        block::PlasmaBlock,
        tx::{Input, Output, Transaction},
    };

    use super::*;

    const ALICE: Address = Address([1; 20]);
    const BOB: Address = Address([2; 20]);

    fn setup() -> QueryService<UtxoDBSled, PlasmaDBSled> {
        let db = Arc::new(sled::Config::new().temporary(true).open().unwrap());
        QueryService::new(
            Arc::new(UtxoDBSled::new(db.clone(), SledDbConfig::test()).unwrap()),
            Arc::new(PlasmaDBSled::new(db, SledDbConfig::test()).unwrap()),
        )
    }

    fn put_blocks(svc: &QueryService<UtxoDBSled, PlasmaDBSled>, count: u64) {
        for n in 1..=count {
            svc.plasma_db
                .put_block(n, PlasmaBlock::new(Buf32([n as u8; 32]), 1, 0, 1_000 + n, n))
                .unwrap();
        }
    }

    /// Alice's deposit 1 spent into a 7/3 split between Bob and Alice in
    /// block 1.
    fn seed_spend(svc: &QueryService<UtxoDBSled, PlasmaDBSled>) -> TxRecord {
        let deposit = Position::deposit(1);
        svc.utxo_db
            .insert_utxo(Utxo::standalone(ALICE, 10, deposit))
            .unwrap();

        let tx = Transaction::new(
            Input::unsigned(deposit),
            None,
            Output::new(BOB, 7),
            Some(Output::new(ALICE, 3)),
            0,
        );
        let merkle_hash = tx.merkle_hash();
        let record = TxRecord {
            tx,
            block_num: 1,
            tx_index: 0,
            merkle_hash,
            confirmation_hash: Buf32([4; 32]),
        };

        let out0 = Utxo::from_tx_output(
            BOB,
            7,
            Position::tx_output(1, 0, 0),
            vec![ALICE],
            merkle_hash,
            record.confirmation_hash,
        );
        let out1 = Utxo::from_tx_output(
            ALICE,
            3,
            Position::tx_output(1, 0, 1),
            vec![ALICE],
            merkle_hash,
            record.confirmation_hash,
        );
        svc.utxo_db
            .spend_utxo(&ALICE, &deposit, vec![out0.key(), out1.key()])
            .unwrap();
        svc.utxo_db.insert_utxo(out0).unwrap();
        svc.utxo_db.insert_utxo(out1).unwrap();
        svc.plasma_db.put_tx_record(record.clone()).unwrap();
        record
    }

    #[test]
    fn test_balance_and_info() {
        let svc = setup();
        seed_spend(&svc);

        assert_eq!(svc.balance(&ALICE).unwrap(), 3);
        assert_eq!(svc.balance(&BOB).unwrap(), 7);

        let info = svc.info(&ALICE).unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].utxo.position, Position::tx_output(1, 0, 1));

        assert!(matches!(
            svc.balance(&Address([3; 20])),
            Err(QueryError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_output_with_creating_tx() {
        let svc = setup();
        let record = seed_spend(&svc);

        let sig = Signature([8; 65]);
        svc.plasma_db
            .append_confirm_sigs(&Position::tx_output(1, 0, 0), &[sig])
            .unwrap();

        let out = svc.output(&Position::tx_output(1, 0, 0)).unwrap();
        assert_eq!(out.utxo.owner, BOB);
        assert_eq!(out.tx, Some(record.clone()));
        assert_eq!(out.confirm_sigs, vec![sig]);
        assert_eq!(out.spent_by, None);

        // the spent deposit points at the transaction that consumed it
        let deposit = svc.output(&Position::deposit(1)).unwrap();
        assert!(!deposit.utxo.valid);
        assert_eq!(deposit.tx, None);
        assert_eq!(deposit.spent_by, Some(record.merkle_hash));

        assert_eq!(svc.tx(&record.merkle_hash).unwrap(), record);
        assert!(matches!(
            svc.tx(&Buf32::zero()),
            Err(QueryError::TxNotFound(_))
        ));
        assert!(matches!(
            svc.output(&Position::tx_output(5, 0, 0)),
            Err(QueryError::OutputNotFound(_))
        ));
    }

    #[test]
    fn test_block_lookup() {
        let svc = setup();
        assert_eq!(svc.height().unwrap(), None);
        put_blocks(&svc, 3);

        assert_eq!(svc.height().unwrap(), Some(3));
        let block = svc.block(2).unwrap();
        assert_eq!(block.number, 2);
        assert_eq!(block.header, Buf32([2; 32]));

        assert!(matches!(svc.block(4), Err(QueryError::BlockNotFound(4))));
        assert!(matches!(svc.block(0), Err(QueryError::InvalidBlockNumber(0))));
    }

    #[test]
    fn test_blocks_window() {
        let svc = setup();
        let empty = svc.blocks(None).unwrap();
        assert_eq!(empty.starting_block, 1);
        assert!(empty.blocks.is_empty());

        put_blocks(&svc, 25);

        let latest = svc.blocks(None).unwrap();
        assert_eq!(latest.starting_block, 16);
        let numbers: Vec<_> = latest.blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, (16..=25).collect::<Vec<_>>());

        let from = svc.blocks(Some(20)).unwrap();
        assert_eq!(from.blocks.len(), 6);
        assert_eq!(from.blocks[0].number, 20);

        assert!(matches!(svc.blocks(Some(0)), Err(QueryError::InvalidBlockNumber(0))));
    }

    #[test]
    fn test_output_info_serializes() {
        let svc = setup();
        seed_spend(&svc);
        let out = svc.output(&Position::tx_output(1, 0, 0)).unwrap();

        let json = serde_json::to_string(&out).unwrap();
        let back: OutputInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out);
    }
}
